use config::{Config, ConfigError, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Client {
    pub base_url: String,
    pub ws_url: String,
    pub use_mock: bool,
}

/// Virtual-currency parameters. Every monetary amount in the system is an
/// integer amount of cents; conversions never touch floating point.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Economy {
    /// Diamonds that convert into one payout unit.
    pub diamonds_per_unit: i64,
    /// Value of one payout unit, in cents.
    pub unit_value_cents: i64,
    /// Withdrawal fee retained by the platform, in basis points.
    pub platform_fee_bps: i64,
    /// Share of a gift's diamond value credited to the host, in basis points.
    pub earnings_share_bps: i64,
    /// Diamonds granted by the quick recharge pack.
    pub recharge_pack_diamonds: i64,
}

impl Economy {
    pub fn gross_cents(&self, diamonds: i64) -> i64 {
        diamonds * self.unit_value_cents / self.diamonds_per_unit
    }

    pub fn fee_cents(&self, gross_cents: i64) -> i64 {
        gross_cents * self.platform_fee_bps / 10_000
    }

    pub fn earnings_share(&self, diamonds: i64) -> i64 {
        diamonds * self.earnings_share_bps / 10_000
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub client: Client,
    pub economy: Economy,
}

impl Settings {
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::Economy;

    fn economy() -> Economy {
        Economy {
            diamonds_per_unit: 3000,
            unit_value_cents: 2500,
            platform_fee_bps: 2000,
            earnings_share_bps: 5000,
            recharge_pack_diamonds: 5000,
        }
    }

    #[test]
    fn three_thousand_diamonds_convert_to_one_unit() {
        assert_eq!(economy().gross_cents(3000), 2500);
        assert_eq!(economy().gross_cents(6000), 5000);
    }

    #[test]
    fn fee_is_twenty_percent_of_gross() {
        assert_eq!(economy().fee_cents(2500), 500);
        assert_eq!(economy().fee_cents(0), 0);
    }

    #[test]
    fn host_receives_half_of_gift_value() {
        assert_eq!(economy().earnings_share(500), 250);
        assert_eq!(economy().earnings_share(1), 0);
    }
}
