use super::*;

#[test]
fn parses_list_with_defaults() {
    let cli = Cli::try_parse_from(["studyspaces", "list"]).expect("expected valid cli args");

    match cli.command {
        Commands::List {
            retries,
            retry_delay_ms,
            view,
            ..
        } => {
            assert_eq!(retries, 2);
            assert_eq!(retry_delay_ms, 1_000);
            assert_eq!(view.sort, SortOption::Closest);
            assert_eq!(view.filter, StatusFilter::All);
            assert!(view.user_location().unwrap().is_none());
        }
        other => panic!("expected list command, got {other:?}"),
    }
}

#[test]
fn parses_list_with_location_and_view_options() {
    let cli = Cli::try_parse_from([
        "studyspaces",
        "list",
        "--lat",
        "40.2025",
        "--lng",
        "-77.1989",
        "--sort",
        "Highest Rated",
        "--filter",
        "open",
    ])
    .expect("expected valid cli args");

    let Commands::List { view, .. } = cli.command else {
        panic!("expected list command");
    };
    assert_eq!(view.sort, SortOption::HighestRated);
    assert_eq!(view.filter, StatusFilter::Open);
    assert_eq!(
        view.user_location().unwrap(),
        Some(Coordinates::new(40.2025, -77.1989))
    );
}

#[test]
fn lat_without_lng_is_rejected() {
    assert!(Cli::try_parse_from(["studyspaces", "list", "--lat", "40.2"]).is_err());
}

#[test]
fn unknown_sort_is_rejected() {
    assert!(Cli::try_parse_from(["studyspaces", "list", "--sort", "nearest"]).is_err());
}

#[test]
fn out_of_range_location_is_an_error() {
    let cli = Cli::try_parse_from(["studyspaces", "enrich", "--lat", "95", "--lng", "0"])
        .expect("expected valid cli args");
    let Commands::Enrich { view, .. } = cli.command else {
        panic!("expected enrich command");
    };
    assert!(view.user_location().is_err());
}

#[test]
fn parses_distance_with_negative_coordinates() {
    let cli = Cli::try_parse_from([
        "studyspaces",
        "distance",
        "40.2025",
        "-77.1989",
        "40.2732",
        "-76.8867",
        "--formula",
        "spherical",
    ])
    .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Distance {
            formula: DistanceFormula::Spherical,
            ..
        }
    ));
}

#[test]
fn enrich_json_flag() {
    let cli = Cli::try_parse_from(["studyspaces", "enrich", "--json", "--data", "spaces.json"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Commands::Enrich { json: true, data: Some(ref p), .. } if p == &PathBuf::from("spaces.json")
    ));
}
