use crate::config::Config;

pub fn mock_cfg() -> Config {
    Config::load_from_str(
        r#"
        [web_server]
        address = "127.0.0.1:0"

        [moisture]
        very_dry = 530
        dry = 430
        normal = 350
        ideal = 320
        wet = 310
        too_wet = 305
        air_value = 750
        water_value = 305

        [watering]
        min_interval_secs = 86400
        auto_duration_secs = 3
        default_duration_secs = 3
        auto_tick_secs = 60
        flow_ml_per_sec = 50
        "#,
    )
    .expect("valid test config")
}
