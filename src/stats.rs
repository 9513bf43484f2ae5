use crate::types::{Aggregate, Category, CategoryAggregate, ReviewRecord, ScoreField};
use crate::util::mean;

/// Count and mean of the usable values of `field`. Records without a value
/// for the field are ignored; if none remain the mean is undefined.
pub fn aggregate<'a, I>(records: I, field: ScoreField) -> Aggregate
where
    I: IntoIterator<Item = &'a ReviewRecord>,
{
    let values: Vec<f64> = records
        .into_iter()
        .filter_map(|r| r.value(field))
        .collect();
    Aggregate {
        count: values.len(),
        mean: mean(&values),
    }
}

/// One aggregate per category, in `Category::ALL` order, each computed
/// independently over the records that carry that category.
pub fn category_aggregates(records: &[&ReviewRecord]) -> Vec<CategoryAggregate> {
    Category::ALL
        .iter()
        .map(|&category| CategoryAggregate {
            category,
            aggregate: aggregate(records.iter().copied(), ScoreField::Category(category)),
        })
        .collect()
}
