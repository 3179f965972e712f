use std::path::Path;

use super::*;

fn site(name: &str) -> SiteConfig {
    SiteConfig {
        name: name.to_string(),
        base_url: "https://depofit.com".to_string(),
        search_url: "https://depofit.com/search?q={query}".to_string(),
        product_path_patterns: default_product_path_patterns(),
        product_query_params: vec![],
        model_labels: default_model_labels(),
        price_selector: None,
        sale_price_selector: None,
        notes: None,
    }
}

#[test]
fn slug_simple_name() {
    assert_eq!(site("Depo Fit").slug(), "depo-fit");
}

#[test]
fn slug_domain_style_name() {
    assert_eq!(site("Depofit.com").slug(), "depofit-com");
}

#[test]
fn slug_strips_special_characters() {
    assert_eq!(site("Martí's Store").slug(), "marts-store");
}

#[test]
fn parse_sites_applies_defaults() {
    let yaml = r#"
sites:
  - name: Depofit
    base_url: https://depofit.com
    search_url: "https://depofit.com/search?q={query}&type=product"
    model_labels: ["Modelo"]
"#;
    let file = parse_sites(yaml).unwrap();
    assert_eq!(file.sites.len(), 1);
    let depofit = &file.sites[0];
    assert_eq!(depofit.product_path_patterns, vec!["/products/"]);
    assert!(depofit.product_query_params.is_empty());
    assert_eq!(depofit.model_labels, vec!["Modelo"]);
    assert!(depofit.price_selector.is_none());
}

#[test]
fn parse_sites_defaults_model_label() {
    let yaml = r#"
sites:
  - name: Example
    base_url: https://example.com
    search_url: "https://example.com/search?q={query}"
"#;
    let file = parse_sites(yaml).unwrap();
    assert_eq!(file.sites[0].model_labels, vec!["Model"]);
}

#[test]
fn parse_sites_preserves_priority_order() {
    let yaml = r#"
sites:
  - name: First
    base_url: https://first.example
    search_url: "https://first.example/search?q={query}"
  - name: Second
    base_url: https://second.example
    search_url: "https://second.example/search?q={query}"
"#;
    let file = parse_sites(yaml).unwrap();
    let names: Vec<&str> = file.sites.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["First", "Second"]);
}

#[test]
fn validate_rejects_empty_site_list() {
    let err = parse_sites("sites: []").unwrap_err();
    assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("at least one site")));
}

#[test]
fn validate_rejects_missing_query_placeholder() {
    let mut bad = site("Depofit");
    bad.search_url = "https://depofit.com/search".to_string();
    let err = validate_sites(&SitesFile { sites: vec![bad] }).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("{query}")));
}

#[test]
fn validate_rejects_non_http_base_url() {
    let mut bad = site("Depofit");
    bad.base_url = "depofit.com".to_string();
    let err = validate_sites(&SitesFile { sites: vec![bad] }).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("base_url")));
}

#[test]
fn validate_rejects_duplicate_names_case_insensitive() {
    let err = validate_sites(&SitesFile {
        sites: vec![site("Depofit"), site("DEPOFIT")],
    })
    .unwrap_err();
    assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("duplicate site name")));
}

#[test]
fn validate_rejects_duplicate_slugs() {
    let err = validate_sites(&SitesFile {
        sites: vec![site("Depo Fit"), site("Depo-Fit")],
    })
    .unwrap_err();
    assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("duplicate site slug")));
}

#[test]
fn validate_rejects_blank_model_label() {
    let mut bad = site("Depofit");
    bad.model_labels = vec!["Modelo".to_string(), "  ".to_string()];
    let err = validate_sites(&SitesFile { sites: vec![bad] }).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("blank")));
}

#[test]
fn validate_rejects_site_without_product_rules() {
    let mut bad = site("Depofit");
    bad.product_path_patterns = vec![];
    let err = validate_sites(&SitesFile { sites: vec![bad] }).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("product_path_patterns")));
}

#[test]
fn find_matches_slug_or_name() {
    let file = SitesFile {
        sites: vec![site("Depo Fit")],
    };
    assert!(file.find("depo-fit").is_some());
    assert!(file.find("depo fit").is_some());
    assert!(file.find("other").is_none());
}

#[test]
fn load_sites_reports_missing_file() {
    let err = load_sites(Path::new("/nonexistent/sites.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::SitesFileIo { .. }));
}

#[test]
fn load_sites_parses_shipped_config() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/sites.yaml");
    let file = load_sites(&path).expect("shipped config/sites.yaml should validate");
    assert!(!file.sites.is_empty());
}
