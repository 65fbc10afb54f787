use sow_config::{load_layered_yaml_from_strings, report_unused_keys, UnusedKeyPolicy, WatchConfig};

const KNOWN_YAML: &str = r#"
pallets:
  watts_per_pallet: 21780
shipping:
  names: ["Transporte", "Portes"]
salesperson:
  default: "Juan"
  tags:
    tomi: "Tomás"
status:
  cancelled: [2]
smtp:
  host_env: "SMTP_HOST"
state:
  path: ".state/so.json"
"#;

#[test]
fn known_keys_are_clean() {
    let loaded = load_layered_yaml_from_strings(&[KNOWN_YAML]).unwrap();
    let report = report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Fail).unwrap();
    assert!(report.is_clean(), "unexpected unused: {:?}", report.unused_leaf_pointers);
    WatchConfig::from_config_json(&loaded.config_json).unwrap();
}

#[test]
fn warn_reports_typos_without_error() {
    let yaml = r#"
pallets:
  watts_per_palet: 20000
holded:
  base_url: "http://localhost"
  api_key: "HOLDED_API_KEY"
"#;
    let loaded = load_layered_yaml_from_strings(&[yaml]).unwrap();
    let report = report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Warn).unwrap();
    assert_eq!(
        report.unused_leaf_pointers,
        vec!["/holded/api_key".to_string(), "/pallets/watts_per_palet".to_string()]
    );
}

#[test]
fn fail_policy_errors_on_unused_keys() {
    let loaded = load_layered_yaml_from_strings(&["extra:\n  foo: 1\n"]).unwrap();
    let err = report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Fail).unwrap_err();
    assert!(err.to_string().contains("CONFIG_UNUSED_KEYS"));
}

#[test]
fn shipped_example_config_is_clean_and_equals_defaults() {
    let yaml = include_str!("../../../config/sow.example.yaml");
    let loaded = load_layered_yaml_from_strings(&[yaml]).unwrap();
    let report = report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Fail).unwrap();
    assert!(report.is_clean());
    assert_eq!(
        WatchConfig::from_config_json(&loaded.config_json).unwrap(),
        WatchConfig::default()
    );
}
