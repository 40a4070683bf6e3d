//! # Integration Tests
//!
//! Cross-crate and end-to-end tests.
//!
//! Covers:
//! - contract shape checks
//! - source -> controller -> encoder -> dispatcher flows
//! - config file driven runs

#[cfg(test)]
mod contract_tests {
    use contracts::{Channel, Command, MonitorBlueprint};

    #[test]
    fn test_contracts_compile() {
        let _ = contracts::ConfigVersion::V1;
        assert_eq!(Channel::Left.marker(), 0x41);
        assert_eq!(Channel::Right.marker(), 0x42);
    }

    #[test]
    fn test_blueprint_survives_toml_round_trip() {
        let blueprint = config_loader::ConfigLoader::load_from_str(
            r#"
            [monitor]
            poll_period = 40
            always_on = false

            [[sinks]]
            name = "console"
            sink_type = "log"
            "#,
            config_loader::ConfigFormat::Toml,
        )
        .unwrap();

        let text = config_loader::ConfigLoader::to_toml(&blueprint).unwrap();
        let reloaded: MonitorBlueprint =
            config_loader::ConfigLoader::load_from_str(&text, config_loader::ConfigFormat::Toml)
                .unwrap();

        assert_eq!(reloaded.monitor, blueprint.monitor);
        assert_eq!(reloaded.sinks.len(), 1);
        assert_eq!(Command::Poll(Channel::Right).to_string(), "poll(right)");
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::collections::HashMap;
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};

    use bsm_engine::BsmController;
    use contracts::{
        BusFrame, CapabilityFlags, Channel, ContractError, FrameSink, MonitorConfig, SinkConfig,
        SinkType, SignalUpdate,
    };
    use dispatcher::{create_dispatcher, encode_all, Dispatcher, SinkHandle};
    use ingestion::{ReplaySource, ScriptedSource, SnapshotSource};
    use observability::RunAggregator;
    use tokio::sync::mpsc;

    /// Sink that keeps every frame it receives
    struct CollectingSink {
        frames: Arc<Mutex<Vec<BusFrame>>>,
    }

    impl FrameSink for CollectingSink {
        fn name(&self) -> &str {
            "collector"
        }

        async fn write(&mut self, frame: &BusFrame) -> Result<(), ContractError> {
            self.frames.lock().unwrap().push(frame.clone());
            Ok(())
        }

        async fn flush(&mut self) -> Result<(), ContractError> {
            Ok(())
        }

        async fn close(&mut self) -> Result<(), ContractError> {
            Ok(())
        }
    }

    /// Drive a source through the controller, returning the collected
    /// frames and the run totals
    async fn drive<S: SnapshotSource>(
        mut source: S,
        mut controller: BsmController,
        shutdown: bool,
    ) -> (Vec<BusFrame>, RunAggregator) {
        let frames = Arc::new(Mutex::new(Vec::new()));
        let (tx, rx) = mpsc::channel(1024);
        let sink = CollectingSink {
            frames: Arc::clone(&frames),
        };
        let handle = Dispatcher::with_handles(vec![SinkHandle::spawn(sink, 1024)], rx).spawn();

        let mut aggregator = RunAggregator::new();
        while let Some(input) = source.next_input() {
            let outcome = controller.update(&input);
            aggregator.update(&outcome);
            for frame in encode_all(&outcome.commands) {
                tx.send(frame).await.unwrap();
            }
        }
        if shutdown {
            for frame in encode_all(&controller.shutdown()) {
                tx.send(frame).await.unwrap();
            }
        }

        drop(tx);
        handle.await.unwrap();
        let collected = frames.lock().unwrap().clone();
        (collected, aggregator)
    }

    fn hex(frames: &[BusFrame]) -> Vec<String> {
        frames.iter().map(|f| f.to_string()).collect()
    }

    /// Scripted drive -> controller -> encoder -> dispatcher
    ///
    /// Checks the exact request sequence on the wire for the first
    /// poll period and a half.
    #[tokio::test]
    async fn test_e2e_request_sequence() {
        let source = ScriptedSource::new("drive").idle(31, 15.0);
        let controller = BsmController::new(MonitorConfig::default(), CapabilityFlags::ENHANCED_BSM);

        let (frames, aggregator) = drive(source, controller, true).await;

        assert_eq!(
            hex(&frames),
            vec![
                "750#4102106000000000", // enable left, cycle 0
                "750#4102216900000000", // poll left, cycle 0
                "750#4202106000000000", // enable right, cycle 0
                "750#4202216900000000", // poll right, cycle 10
                "750#4102216900000000", // poll left, cycle 20
                "750#4202216900000000", // poll right, cycle 30
                "750#4102100100000000", // shutdown, left first
                "750#4202100100000000",
            ]
        );
        assert!(frames.iter().all(|f| f.address == 0x750 && f.bus == 0));
        assert_eq!(aggregator.cycles(), 31);
        assert_eq!(aggregator.summary().signal_absent, 31);
    }

    /// A single reading raises the warning, which holds for the decay
    /// window, drops, and re-arms from the persisting latched value.
    #[test]
    fn test_e2e_warning_hold_and_expiry() {
        let mut source = ScriptedSource::new("pass")
            .step(SignalUpdate::reading(12.0, 3.0, 0x41), 10.0)
            .idle(101, 10.0);
        let mut controller =
            BsmController::new(MonitorConfig::default(), CapabilityFlags::ENHANCED_BSM);

        let mut left = Vec::new();
        while let Some(input) = source.next_input() {
            left.push(controller.update(&input).left_warning());
        }

        assert!(left[..100].iter().all(|&w| w));
        assert!(!left[100]);
        assert!(left[101]);
        assert!(!controller.warnings()[Channel::Right]);
    }

    #[tokio::test]
    async fn test_e2e_speed_gated_sessions() {
        let config = MonitorConfig {
            always_on: false,
            ..Default::default()
        };
        let controller = BsmController::new(config, CapabilityFlags::ENHANCED_BSM);
        // Parked, then driving, then parked long enough to idle out.
        let source = ScriptedSource::new("stop-go")
            .idle(5, 0.0)
            .idle(1, 8.0)
            .idle(60, 0.0);

        let (frames, aggregator) = drive(source, controller, false).await;

        let left = aggregator.commands(Channel::Left);
        let right = aggregator.commands(Channel::Right);
        assert_eq!((left.enable, left.disable), (1, 1));
        assert_eq!((right.enable, right.disable), (1, 1));
        assert_eq!(frames[0].to_string(), "750#4102106000000000");
        assert_eq!(
            frames.last().map(|f| f.to_string()).as_deref(),
            Some("750#4202100100000000")
        );
    }

    #[tokio::test]
    async fn test_e2e_unsupported_vehicle_is_silent() {
        let source = ScriptedSource::new("drive")
            .step(SignalUpdate::reading(30.0, 30.0, 0x42), 20.0)
            .idle(40, 20.0);
        let controller = BsmController::new(MonitorConfig::default(), CapabilityFlags::empty());

        let (frames, aggregator) = drive(source, controller, true).await;

        assert!(frames.is_empty());
        assert_eq!(aggregator.warnings(Channel::Right).active_cycles, 0);
    }

    /// Config file + JSONL replay -> file sink
    #[tokio::test]
    async fn test_e2e_replay_to_file_sink() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("frames.log");

        let config_path = dir.path().join("bsm.toml");
        std::fs::write(
            &config_path,
            format!(
                r#"
                [monitor]
                poll_period = 4

                [[sinks]]
                name = "recorder"
                sink_type = "file"
                [sinks.params]
                path = "{}"
                interface = "vcan0"
                "#,
                log_path.display()
            ),
        )
        .unwrap();
        let blueprint = config_loader::ConfigLoader::load_from_path(&config_path).unwrap();

        let replay = "\
            {\"vego\": 12.0, \"distance_1\": 14.0, \"distance_2\": 2.0, \"side\": 66}\n\
            {\"vego\": 12.0}\n\
            {\"vego\": 12.0}\n";
        let mut source = ReplaySource::from_reader("inline", Cursor::new(replay)).unwrap();
        assert_eq!(source.len(), 3);

        let mut controller = BsmController::new(
            blueprint.monitor.clone(),
            blueprint.vehicle.capability_flags,
        );
        let (tx, rx) = mpsc::channel(16);
        let handle = create_dispatcher(&blueprint.sinks, rx).unwrap().spawn();

        let mut right_warnings = Vec::new();
        while let Some(input) = source.next_input() {
            let outcome = controller.update(&input);
            right_warnings.push(outcome.right_warning());
            for frame in encode_all(&outcome.commands) {
                tx.send(frame).await.unwrap();
            }
        }
        drop(tx);
        let report = handle.await.unwrap();

        assert_eq!(right_warnings, vec![true, true, true]);
        assert_eq!(report[0].1.write_count, 4);

        // enable left, poll left, enable right (cycle 0), poll right (cycle 2)
        let log = std::fs::read_to_string(&log_path).unwrap();
        let frames: Vec<_> = log
            .lines()
            .map(|line| line.split(' ').nth(2).unwrap().to_string())
            .collect();
        assert_eq!(
            frames,
            vec![
                "750#4102106000000000",
                "750#4102216900000000",
                "750#4202106000000000",
                "750#4202216900000000",
            ]
        );
        assert!(log.lines().all(|line| line.contains(" vcan0 ")));
    }

    #[tokio::test]
    async fn test_e2e_log_sink_from_config() {
        let (tx, rx) = mpsc::channel(4);
        let configs = vec![SinkConfig {
            name: "console".to_string(),
            sink_type: SinkType::Log,
            queue_capacity: 4,
            params: HashMap::new(),
        }];

        let handle = create_dispatcher(&configs, rx).unwrap().spawn();
        for frame in encode_all(&[contracts::Command::Poll(Channel::Left)]) {
            tx.send(frame).await.unwrap();
        }
        drop(tx);

        let report = handle.await.unwrap();
        assert_eq!(report[0].0, "console");
        assert_eq!(report[0].1.write_count, 1);
    }
}
