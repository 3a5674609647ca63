use crate::store::ConfigProvider;
use crate::tax::TaxError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("personal deduction must not be negative: {0}")]
    NegativePersonalDeduction(Decimal),
    #[error("k-receipt cap must not be negative: {0}")]
    NegativeKReceiptCap(Decimal),
}

/// Deduction parameters supplied to every calculation.
///
/// Owned by the store; engines only ever see an immutable snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    pub personal_deduction: Decimal,
    pub k_receipt_cap: Decimal,
}

impl Configuration {
    #[cfg(test)]
    pub fn new(personal_deduction: Decimal, k_receipt_cap: Decimal) -> Self {
        Configuration {
            personal_deduction,
            k_receipt_cap,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.personal_deduction < Decimal::ZERO {
            return Err(ConfigError::NegativePersonalDeduction(self.personal_deduction));
        }
        if self.k_receipt_cap < Decimal::ZERO {
            return Err(ConfigError::NegativeKReceiptCap(self.k_receipt_cap));
        }
        Ok(())
    }
}

/// Partial update; fields left as `None` keep their stored value.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigUpdate {
    pub personal_deduction: Option<Decimal>,
    pub k_receipt_cap: Option<Decimal>,
}

impl ConfigUpdate {
    pub fn is_empty(&self) -> bool {
        self.personal_deduction.is_none() && self.k_receipt_cap.is_none()
    }

    fn apply_to(&self, config: &mut Configuration) {
        if let Some(personal_deduction) = self.personal_deduction {
            config.personal_deduction = personal_deduction;
        }
        if let Some(k_receipt_cap) = self.k_receipt_cap {
            config.k_receipt_cap = k_receipt_cap;
        }
    }
}

/// Overlay `update` onto the stored configuration.
///
/// A zeroed row is inserted first when none exists yet, then the merged
/// configuration is validated and written back.
pub fn apply_update<S: ConfigProvider>(
    store: &mut S,
    update: ConfigUpdate,
) -> Result<Configuration, TaxError> {
    let mut config = match store.get_config()? {
        Some(config) => config,
        None => {
            log::info!("No configuration stored, inserting defaults");
            let config = Configuration::default();
            store.insert_config(&config)?;
            config
        }
    };

    update.apply_to(&mut config);
    config.validate()?;
    store.update_config(&config)?;

    log::info!(
        "Configuration updated: personal deduction {}, k-receipt cap {}",
        config.personal_deduction,
        config.k_receipt_cap
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::JsonStore;
    use rust_decimal_macros::dec;

    #[test]
    fn negative_values_rejected() {
        let config = Configuration::new(dec!(-1), dec!(0));
        assert_eq!(
            config.validate(),
            Err(ConfigError::NegativePersonalDeduction(dec!(-1)))
        );

        let config = Configuration::new(dec!(60000), dec!(-50000));
        assert_eq!(
            config.validate(),
            Err(ConfigError::NegativeKReceiptCap(dec!(-50000)))
        );
    }

    #[test]
    fn zero_values_allowed() {
        assert!(Configuration::default().validate().is_ok());
    }

    #[test]
    fn update_inserts_when_missing() {
        let mut store = JsonStore::in_memory();
        let update = ConfigUpdate {
            personal_deduction: Some(dec!(60000)),
            k_receipt_cap: None,
        };

        let config = apply_update(&mut store, update).unwrap();
        assert_eq!(config, Configuration::new(dec!(60000), dec!(0)));
        assert_eq!(store.get_config().unwrap(), Some(config));
    }

    #[test]
    fn update_keeps_unset_fields() {
        let mut store = JsonStore::in_memory();
        store
            .insert_config(&Configuration::new(dec!(60000), dec!(50000)))
            .unwrap();

        let update = ConfigUpdate {
            personal_deduction: None,
            k_receipt_cap: Some(dec!(30000)),
        };
        let config = apply_update(&mut store, update).unwrap();
        assert_eq!(config, Configuration::new(dec!(60000), dec!(30000)));
    }

    #[test]
    fn invalid_update_not_written() {
        let mut store = JsonStore::in_memory();
        store
            .insert_config(&Configuration::new(dec!(60000), dec!(50000)))
            .unwrap();

        let update = ConfigUpdate {
            personal_deduction: Some(dec!(-10)),
            k_receipt_cap: None,
        };
        let err = apply_update(&mut store, update).unwrap_err();
        assert!(matches!(err, TaxError::InvalidConfiguration(_)));
        assert_eq!(
            store.get_config().unwrap(),
            Some(Configuration::new(dec!(60000), dec!(50000)))
        );
    }
}
