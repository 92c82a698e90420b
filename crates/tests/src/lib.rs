//! # Integration Tests
//!
//! End-to-end tests across crates:
//! - contract defaults and wire shape
//! - world view -> listener -> registry flows with mock and replay feeds
//! - config file -> module wiring

#[cfg(test)]
mod contract_tests {
    use contracts::{SensorKey, SensorMessage, SensorType};

    #[test]
    fn test_default_config_shape() {
        let config = contracts::SensorMasterConfig::default();
        assert_eq!(config.version, contracts::ConfigVersion::V1);
        assert_eq!(config.registry.unknown_sensors, contracts::UnknownSensorPolicy::Drop);
        assert!(config.feeds.is_empty());
        assert!(config.replay.is_none());
    }

    #[test]
    fn test_wire_message_keys() {
        let message: SensorMessage =
            serde_json::from_str(r#"{"type":"Sonar","name":"Front","time":1.5,"value":2.0}"#)
                .unwrap();
        assert_eq!(message.type_key(), SensorKey::normalize("sonar"));
        assert_eq!(message.name_key().as_str(), "front");
        assert_eq!(SensorType::from_tag(&message.sensor_type), Some(SensorType::Range));
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::io::Write;
    use std::sync::Arc;
    use std::time::Duration;

    use contracts::{
        RegistryConfig, ReplayConfig, SensorCapability, SensorClass, SensorMessage, SensorType,
        UnknownSensorPolicy, WorldView,
    };
    use ingestion::{
        IngestionMetrics, LocalWorldView, MockSensorFeed, ReplayFeed, SensorMessageListener,
    };
    use registry::SensorRegistry;
    use sensor_module::{ModuleState, SensorMasterModule};

    fn range(name: &str, value: f64) -> SensorMessage {
        SensorMessage::new("range", name).with_field("value", value)
    }

    async fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        while tokio::time::Instant::now() < deadline {
            if condition() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        condition()
    }

    /// Two range sensors, then one of them updates.
    #[test]
    fn test_module_files_range_sensors() {
        let view = Arc::new(LocalWorldView::new());
        let module = SensorMasterModule::start_new(view.clone(), &RegistryConfig::default()).unwrap();

        view.publish(&range("r1", 3.2));
        view.publish(&range("r2", 5.0));
        view.publish(&range("R1", 1.1));

        let sensors = module.sensors_by_type("RANGE").unwrap();
        assert_eq!(sensors.len(), 2);
        assert_eq!(sensors[0].name().as_str(), "r1");
        assert_eq!(sensors[0].reading().as_range(), Some(1.1));
        assert_eq!(sensors[1].reading().as_range(), Some(5.0));

        let status = module.status();
        assert_eq!(status.filing.created, 2);
        assert_eq!(status.filing.updated, 1);
        assert_eq!(status.ingestion.messages_received, 3);

        let descriptions = module.non_empty_descriptions();
        assert_eq!(descriptions.len(), 2);
        assert!(descriptions.iter().all(|d| d.sensor_type.as_str() == "range"));
    }

    /// Mock feeds run until every configured sensor shows up.
    #[tokio::test]
    async fn test_mock_feeds_make_registry_ready() {
        let view = Arc::new(LocalWorldView::new());
        let module = SensorMasterModule::start_new(view.clone(), &RegistryConfig::default()).unwrap();

        let feeds = vec![
            MockSensorFeed::range("front", 200.0).unwrap(),
            MockSensorFeed::gps("gps0", 200.0).unwrap(),
            MockSensorFeed::camera("cam", 200.0, 64, 48).unwrap(),
        ];
        for feed in &feeds {
            feed.start(view.clone());
        }

        let ready = wait_until(Duration::from_secs(5), || {
            module.is_sensor_ready(SensorType::Range)
                && module.is_sensor_ready(SensorType::Gps)
                && module.is_sensor_ready(SensorType::Camera)
        })
        .await;

        for feed in &feeds {
            feed.stop();
        }

        assert!(ready, "feeds never filed every sensor");
        assert_eq!(module.sensors_by_class(SensorClass::Any).len(), 3);
        assert_eq!(module.sensors_by_class(SensorCapability::Imaging).len(), 1);
        assert!(feeds.iter().all(|feed| feed.frames_sent() > 0));
        assert_eq!(module.status().filing.malformed, 0);
    }

    /// A recording on disk replays into the module in file order.
    #[test]
    fn test_replay_file_into_module() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for line in [
            "# recorded run",
            r#"{"type":"sonar","name":"front","time":0.00,"value":4.0}"#,
            r#"{"type":"gps","name":"g1","time":0.01,"latitude":50.1,"longitude":14.4}"#,
            "",
            r#"{"type":"victim","name":"v1","time":0.02,"status":"found"}"#,
            r#"{"type":"sonar","name":"front","time":0.03,"value":2.5}"#,
        ] {
            writeln!(file, "{line}").unwrap();
        }

        let view = Arc::new(LocalWorldView::new());
        let module = SensorMasterModule::start_new(view.clone(), &RegistryConfig::default()).unwrap();

        let mut config = ReplayConfig::new(file.path());
        config.speed_multiplier = 10.0;
        let replay = ReplayFeed::load(&config).unwrap();
        assert_eq!(replay.len(), 4);

        replay.start(view.clone());
        replay.wait();

        assert_eq!(replay.published(), 4);
        let front = module.sensor_by_type_name("Sonar", "FRONT").unwrap();
        assert_eq!(front.reading().as_range(), Some(2.5));
        assert_eq!(front.time(), Some(0.03));
        assert!(module.sensors_by_type("victim").is_none());
        assert_eq!(module.status().filing.unsupported, 1);
    }

    /// Config file drives the registry policy of a running module.
    #[test]
    fn test_config_file_to_module() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[registry]
unknown_sensors = "retain"

[[feeds]]
name = "v1"
sensor_type = "victim"
frequency_hz = 2.0
"#
        )
        .unwrap();

        let config = config_loader::ConfigLoader::load_from_path(file.path()).unwrap();
        assert_eq!(config.registry.unknown_sensors, UnknownSensorPolicy::Retain);

        let view = Arc::new(LocalWorldView::new());
        let module = SensorMasterModule::start_new(view.clone(), &config.registry).unwrap();
        view.publish(&SensorMessage::new("victim", "v1").with_field("status", "found"));

        let victims = module.sensors_by_type("victim").unwrap();
        assert_eq!(victims.len(), 1);
        assert_eq!(victims[0].sensor_type(), SensorType::Unknown);
        assert!(module.is_ready());
    }

    /// Unsubscribing twice, once after the transport is gone, stays quiet.
    #[test]
    fn test_listener_survives_closed_world_view() {
        let view = Arc::new(LocalWorldView::new());
        let registry = Arc::new(SensorRegistry::new());
        let metrics = Arc::new(IngestionMetrics::new());

        let listener =
            SensorMessageListener::subscribe(view.clone(), registry.clone(), metrics.clone())
                .unwrap();
        view.publish(&range("r1", 1.0));
        view.close();

        assert!(listener.unsubscribe());
        assert!(!listener.unsubscribe());
        assert!(!listener.is_subscribed());
        assert_eq!(view.publish(&range("r2", 2.0)), 0);
        assert_eq!(registry.len(), 1);
        assert_eq!(metrics.snapshot().messages_received, 1);
        assert_eq!(registry.stats().created, 1);
        assert!(view.subscribe(Arc::new(|_: &SensorMessage| {})).is_err());
    }

    /// Feeds keep publishing after shutdown; nothing reaches the module.
    #[tokio::test]
    async fn test_shutdown_while_feed_running() {
        let view = Arc::new(LocalWorldView::new());
        let module = SensorMasterModule::start_new(view.clone(), &RegistryConfig::default()).unwrap();
        let feed = MockSensorFeed::range("front", 200.0).unwrap();
        feed.start(view.clone());

        assert!(wait_until(Duration::from_secs(5), || module.is_ready()).await);

        assert!(module.shutdown());
        assert!(!module.shutdown());
        assert_eq!(module.state(), ModuleState::ShutDown);
        assert_eq!(view.subscriber_count(), 0);

        let sent = feed.frames_sent();
        assert!(wait_until(Duration::from_secs(5), || feed.frames_sent() > sent).await);
        feed.stop();

        assert!(!module.is_ready());
        assert!(module.sensors_by_class(SensorClass::Any).is_empty());
        assert!(module.sensor_by_type_name("range", "front").is_none());
    }
}
