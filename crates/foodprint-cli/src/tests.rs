use super::*;
use crate::analyze::{render_analysis, render_distance};
use foodprint_analysis::{Analysis, PipelineWarning, Stage};
use foodprint_core::{AlternativeOption, ProduceInfo};
use foodprint_geo::{DistanceEstimate, DistanceMethod};

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["foodprint"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn parses_analyze_with_city_and_country() {
    let cli = Cli::try_parse_from([
        "foodprint",
        "analyze",
        "--produce",
        "avocado",
        "--source",
        "Lima, Peru",
        "--city",
        "Amsterdam",
        "--country",
        "Netherlands",
    ])
    .unwrap();

    match cli.command {
        Some(Commands::Analyze {
            produce,
            source,
            location,
            month,
            json,
        }) => {
            assert_eq!(produce, "avocado");
            assert_eq!(source, "Lima, Peru");
            assert_eq!(location.city.as_deref(), Some("Amsterdam"));
            assert_eq!(location.country.as_deref(), Some("Netherlands"));
            assert!(!location.locate);
            assert!(month.is_none());
            assert!(!json);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn analyze_accepts_negative_coordinates() {
    let cli = Cli::try_parse_from([
        "foodprint",
        "analyze",
        "--produce",
        "apple",
        "--source",
        "chile",
        "--lat",
        "-33.87",
        "--lng",
        "151.21",
        "--json",
    ])
    .unwrap();

    assert!(matches!(
        cli.command,
        Some(Commands::Analyze {
            location: LocationArgs {
                lat: Some(lat),
                lng: Some(_),
                ..
            },
            json: true,
            ..
        }) if (lat + 33.87).abs() < 1e-9
    ));
}

#[test]
fn latitude_requires_longitude() {
    let result = Cli::try_parse_from([
        "foodprint", "analyze", "--produce", "apple", "--source", "chile", "--lat", "10",
    ]);
    assert!(result.is_err());
}

#[test]
fn month_must_be_zero_to_eleven() {
    let ok = Cli::try_parse_from([
        "foodprint", "season", "--produce", "tomato", "--city", "Paris", "--month", "11",
    ]);
    assert!(ok.is_ok());

    let bad = Cli::try_parse_from([
        "foodprint", "season", "--produce", "tomato", "--city", "Paris", "--month", "12",
    ]);
    assert!(bad.is_err());
}

#[test]
fn parses_distance_with_locate() {
    let cli =
        Cli::try_parse_from(["foodprint", "distance", "--source", "spain", "--locate"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Distance {
            ref source,
            location: LocationArgs { locate: true, .. },
        }) if source == "spain"
    ));
}

#[test]
fn manual_location_keeps_coordinates_and_place() {
    let args = LocationArgs {
        lat: Some(52.37),
        lng: Some(4.90),
        city: Some("Amsterdam".to_string()),
        ..LocationArgs::default()
    };
    let loc = args.manual().unwrap();
    assert!(loc.coordinates().is_some());
    assert_eq!(loc.display(), "Amsterdam");
}

#[test]
fn manual_location_rejects_out_of_range_latitude() {
    let args = LocationArgs {
        lat: Some(95.0),
        lng: Some(0.0),
        ..LocationArgs::default()
    };
    assert!(args.manual().is_err());
}

#[test]
fn distance_output_names_the_method() {
    let text = render_distance(DistanceEstimate {
        km: 5000,
        method: DistanceMethod::Default,
    });
    assert_eq!(text, "5000 km (assumed, source not found)");
}

#[test]
fn analysis_report_lists_alternatives_and_warnings() {
    let analysis = Analysis {
        info: ProduceInfo {
            name: "avocado".to_string(),
            source: "Lima, Peru".to_string(),
            co2_impact: 2.5,
            travel_distance: 9200,
            ripening_method: None,
            in_season: false,
            seasonal_alternatives: vec![AlternativeOption {
                name: "Pear".to_string(),
                co2_impact: 0.12,
                distance_reduction: 85,
                benefits: vec!["Reduces transport emissions by 85%".to_string()],
                nutritional_similarity: None,
            }],
            local_alternatives: vec![],
            user_location: "Amsterdam".to_string(),
        },
        warnings: vec![PipelineWarning::ModelUnavailable {
            stage: Stage::Alternatives,
            reason: "cold".to_string(),
        }],
    };

    let text = render_analysis(&analysis, 2);
    assert!(text.contains("CO2 impact:      2.50 kg CO2e per kg"));
    assert!(text.contains("In season:       no (March)"));
    assert!(text.contains("Ripening:        no concerns"));
    assert!(text.contains("  - Pear: 85% less travel, 0.12 kg CO2e"));
    assert!(!text.contains("Local alternatives"));
    assert!(text.contains("! classifier unavailable during alternatives: cold"));
}
