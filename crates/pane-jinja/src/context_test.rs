use super::*;

#[test]
fn test_new_from_config() {
    let config = Config::from_yaml("size: {width: 400, height: 300}\nvars:\n  units: metric\n").unwrap();
    let context = RenderContext::new(&config);

    assert_eq!(context.size, ScreenSize { width: 400, height: 300 });
    assert_eq!(context.config, serde_json::json!({"units": "metric"}));
    assert_eq!(context.data, serde_json::json!({}));
    assert!(uuid::Uuid::parse_str(&context.trmnl.system.render_id).is_ok());
    assert!(chrono::DateTime::parse_from_rfc3339(&context.trmnl.system.timestamp_utc).is_ok());
}

#[test]
fn test_render_ids_are_unique() {
    assert_ne!(SystemContext::new().render_id, SystemContext::new().render_id);
}

#[test]
fn test_serialized_shape() {
    let system = SystemContext {
        render_id: "r1".to_string(),
        timestamp_utc: "2024-01-01T00:00:00+00:00".to_string(),
        pane_version: "0.0.0".to_string(),
    };
    let context = RenderContext::default()
        .with_system(system)
        .with_data(serde_json::json!({"temp": 21}))
        .with_device_value("device", serde_json::json!({"name": "kitchen"}))
        .with_variable("title", serde_json::json!("Weather"));

    let json = serde_json::to_value(&context).unwrap();
    assert_eq!(json["trmnl"]["system"]["render_id"], "r1");
    assert_eq!(json["trmnl"]["device"]["name"], "kitchen");
    assert_eq!(json["size"]["width"], 800);
    assert_eq!(json["data"]["temp"], 21);
    assert_eq!(json["title"], "Weather");
}

#[test]
fn test_with_variable_reserved_keys() {
    let context = RenderContext::default()
        .with_variable("data", serde_json::json!([1]))
        .with_variable("size", serde_json::json!("huge"));
    assert_eq!(context.data, serde_json::json!([1]));
    assert_eq!(context.size, ScreenSize::default());
    assert!(context.extra.is_empty());
}

#[test]
fn test_to_value() {
    let value = RenderContext::default().to_value();
    let size = value.get_attr("size").unwrap();
    assert_eq!(size.get_attr("height").unwrap(), minijinja::Value::from(480));
}
