use super::*;

#[test]
fn parses_lookup_command() {
    let cli = Cli::try_parse_from(["skuscan", "lookup", "48.98721"]).expect("expected valid cli args");

    assert!(!cli.json);
    assert!(matches!(
        cli.command,
        Some(Commands::Lookup { ref identifier, site: None }) if identifier == "48.98721"
    ));
}

#[test]
fn parses_lookup_with_site() {
    let cli = Cli::try_parse_from(["skuscan", "lookup", "HV6341-702", "--site", "innvictus"])
        .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Lookup { site: Some(ref site), .. }) if site == "innvictus"
    ));
}

#[test]
fn lookup_accepts_blank_identifier() {
    // Blank input is a view state, not a usage error.
    let cli = Cli::try_parse_from(["skuscan", "lookup", ""]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Lookup { ref identifier, .. }) if identifier.is_empty()
    ));
}

#[test]
fn lookup_requires_identifier() {
    assert!(Cli::try_parse_from(["skuscan", "lookup"]).is_err());
}

#[test]
fn parses_compare_with_global_json_flag() {
    let cli = Cli::try_parse_from(["skuscan", "compare", "48.98721", "--json"])
        .expect("expected valid cli args");

    assert!(cli.json);
    assert!(matches!(cli.command, Some(Commands::Compare { .. })));
}

#[test]
fn parses_sites_path_override() {
    let cli = Cli::try_parse_from(["skuscan", "--sites", "/tmp/sites.yaml", "sites"])
        .expect("expected valid cli args");

    assert_eq!(cli.sites, Some(PathBuf::from("/tmp/sites.yaml")));
    assert!(matches!(cli.command, Some(Commands::Sites)));
}

#[test]
fn parses_scan_command() {
    let cli = Cli::try_parse_from(["skuscan", "scan"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Some(Commands::Scan { site: None })));
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["skuscan"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}
