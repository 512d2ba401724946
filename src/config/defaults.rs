use super::*;

impl Default for TibberConfig {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            home_id: None,
            price_inc_tax: true,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: "/var/lib/tibber-price".to_string(),
        }
    }
}

impl Default for SensorsConfig {
    fn default() -> Self {
        Self {
            activate_price_sensor: true,
            activate_relative_price_sensor: true,
            activate_gauge_price_sensor: false,
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            activate_price_graphing: false,
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            boot_delay_secs: 5,
            poll_interval_secs: 60,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            console_level: None,
            file_level: None,
            file: "/tmp/tibber-price.log".to_string(),
            backup_count: 5,
            console_output: true,
            json_format: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tibber: TibberConfig::default(),
            storage: StorageConfig::default(),
            sensors: SensorsConfig::default(),
            chart: ChartConfig::default(),
            scheduler: SchedulerConfig::default(),
            logging: LoggingConfig::default(),
            timezone: "Europe/Stockholm".to_string(),
        }
    }
}
