use chrono::NaiveDate;
use csat_forecast::{forecast, load_from_reader, Category, ForecastConfig, Scenario, SolveOutcome};

const EXPORT: &str = "\
Date,Ratings,Value For Money,Security,Location,Staff,Atmosphere,Cleanliness,Facilities,Comment
05/11/2023,6.0,6,7,8,6,5,6,6,Noisy dorm and slow check-in
30/11/2023,7.0,,,,,,,,
01/12/2023,9.0,9,9,9,9,9,9,9,Great location
15/01/2024,8.0,8,,9,10,8,8,7,\"Friendly staff, great location!\"
02/03/2024,9.5,10,9,10,10,9,9,9,Staff were great
20/05/2024,seven,,,,,,,,Would not rate
31/05/2024,8.5,,,,,,,,
,9.0,,,,,,,,
14/06/2024,3.0,,,,,,,,Future review
";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn csv_export_to_forecast() {
    let (records, load) = load_from_reader(EXPORT.as_bytes()).unwrap();
    assert_eq!(load.total_rows, 9);
    assert_eq!(load.valid_rows, 7);
    assert_eq!(load.invalid_score, 1);
    assert_eq!(load.invalid_date, 1);

    let config = ForecastConfig::new(
        date(2024, 5, 31),
        8.8,
        Scenario::ReviewsNeeded {
            expected_new_avg: 9.8,
        },
    );
    let report = forecast(&records, load, &config);

    // cutoff 30/11/2023 is itself expiring
    assert_eq!(report.cutoff_date, date(2023, 11, 30));
    assert_eq!(report.expiring.count, 2);
    assert_eq!(report.retained.count, 4);
    assert_eq!(report.future_dated, 1);
    assert_eq!(report.retained.count + report.expiring.count + report.future_dated, 7);

    // retained 9.0 + 8.0 + 9.5 + 8.5 = 35.0, expiring 13.0
    assert_eq!(report.baseline.base_remaining, 2);
    assert!((report.baseline.after_drop_total - 22.0).abs() < 1e-9);
    assert_eq!(report.no_new_reviews_avg, Some(11.0));

    // 8.8 * 3 - 22 = 4.4 points, 4.4 / 1.0 -> 5 reviews
    assert_eq!(report.outcome, SolveOutcome::ReviewsNeeded { count: 5 });

    let staff = report
        .categories
        .iter()
        .find(|c| c.category == Category::Staff)
        .unwrap();
    assert_eq!(staff.aggregate.count, 3);
    assert!((staff.aggregate.mean.unwrap() - 29.0 / 3.0).abs() < 1e-9);

    let top: Vec<&str> = report.top_terms.iter().map(|t| t.term.as_str()).collect();
    assert_eq!(&top[..3], &["great", "location", "staff"]);
}

#[test]
fn forecast_report_serializes_undefined_as_null() {
    let (records, load) = load_from_reader(EXPORT.as_bytes()).unwrap();
    let config = ForecastConfig::new(
        date(2020, 1, 1),
        8.0,
        Scenario::RequiredAverage {
            new_review_count: 0,
        },
    );
    let report = forecast(&records, load, &config);
    assert_eq!(report.retained.count, 0);

    let json = serde_json::to_value(&report).unwrap();
    assert!(json["retained"]["mean"].is_null());
    assert!(json["no_new_reviews_avg"].is_null());
    assert_eq!(json["outcome"]["status"], "undefined");
}
