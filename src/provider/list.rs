//! List provider, also serving list-form usernames

use super::{ParameterDataProvider, PoolCursors};
use crate::data::{ArgumentValue, ListDataConfig, ParameterProviderLevel, ParameterValue};
use crate::error::Error;
use crate::Result;
use tracing::debug;

pub struct ListParameterDataProvider {
    parameter_name: String,
    level: ParameterProviderLevel,
    values: Vec<ParameterValue>,
    cursors: PoolCursors,
}

impl ListParameterDataProvider {
    pub fn new(parameter_name: impl Into<String>, values: Vec<ParameterValue>, level: ParameterProviderLevel) -> Self {
        let parameter_name = parameter_name.into();
        Self {
            cursors: PoolCursors::new(parameter_name.clone()),
            parameter_name,
            level,
            values,
        }
    }

    pub fn from_config(config: &ListDataConfig) -> Self {
        Self::new(config.parameter_name.clone(), config.values.clone(), config.level)
    }

    fn argument(&self, index: u64) -> ArgumentValue {
        ArgumentValue {
            name: self.parameter_name.clone(),
            value: self.values[index as usize].clone(),
        }
    }

    fn len(&self) -> u64 {
        self.values.len() as u64
    }
}

impl ParameterDataProvider for ListParameterDataProvider {
    fn parameter_name(&self) -> &str {
        &self.parameter_name
    }

    fn level(&self) -> ParameterProviderLevel {
        self.level
    }

    fn initialize(&self) -> Result<()> {
        if self.values.is_empty() {
            return Err(Error::config(format!(
                "No values are provided for parameter '{}'",
                self.parameter_name
            )));
        }
        self.cursors.reset();
        debug!("Initialized list provider '{}' with {} values", self.parameter_name, self.values.len());
        Ok(())
    }

    fn generate_new_value_per_thread(&self, thread_id: u64, _previous: &[ArgumentValue]) -> Result<ArgumentValue> {
        let index = self.cursors.next_per_thread(thread_id, self.len())?;
        Ok(self.argument(index))
    }

    fn generate_new_value_per_thread_static(&self, thread_id: u64, _previous: &[ArgumentValue]) -> Result<ArgumentValue> {
        let index = self.cursors.per_thread_static(thread_id, self.len())?;
        Ok(self.argument(index))
    }

    fn generate_new_value_per_invocation(&self, _previous: &[ArgumentValue]) -> Result<ArgumentValue> {
        let index = self.cursors.next_per_invocation(self.len())?;
        Ok(self.argument(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(count: i64, level: ParameterProviderLevel) -> ListParameterDataProvider {
        let provider = ListParameterDataProvider::new("p", (0..count).map(ParameterValue::Integer).collect(), level);
        provider.initialize().unwrap();
        provider
    }

    fn int(arg: ArgumentValue) -> i64 {
        match arg.value {
            ParameterValue::Integer(v) => v,
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_per_invocation_wraparound() {
        let provider = provider(5, ParameterProviderLevel::PerInvocation);
        let seen: Vec<i64> = (0..7).map(|_| int(provider.get_value(&[]).unwrap())).collect();
        assert_eq!(seen, vec![0, 1, 2, 3, 4, 0, 1]);
    }

    #[test]
    fn test_per_thread_static_stable() {
        let provider = provider(3, ParameterProviderLevel::PerThreadStatic);
        let first = provider.get_value_for_thread(1, &[]).unwrap();
        assert_eq!(provider.get_value_for_thread(1, &[]).unwrap(), first);
        assert_ne!(provider.get_value_for_thread(2, &[]).unwrap(), first);
        assert_eq!(int(provider.get_value_for_thread(4, &[]).unwrap()), 1);
    }

    #[test]
    fn test_per_thread_round_robin() {
        let provider = provider(3, ParameterProviderLevel::PerThread);
        let t1: Vec<i64> = (0..4).map(|_| int(provider.get_value_for_thread(1, &[]).unwrap())).collect();
        assert_eq!(t1, vec![0, 1, 2, 0]);
        assert_eq!(int(provider.get_value_for_thread(9, &[]).unwrap()), 0);
    }

    #[test]
    fn test_uninitialized() {
        let provider = ListParameterDataProvider::new("p", vec!["a".into()], ParameterProviderLevel::PerThread);
        let err = provider.get_value(&[]).unwrap_err();
        assert_eq!(err.to_string(), "Data provider for parameter 'p' is not initialized");
    }

    #[test]
    fn test_reinitialize_resets() {
        let provider = provider(4, ParameterProviderLevel::PerInvocation);
        provider.get_value(&[]).unwrap();
        provider.get_value(&[]).unwrap();
        provider.initialize().unwrap();
        assert_eq!(int(provider.get_value(&[]).unwrap()), 0);
    }

    #[test]
    fn test_empty_list_fails_initialize() {
        let provider = ListParameterDataProvider::new("p", Vec::new(), ParameterProviderLevel::PerThread);
        assert!(provider.initialize().is_err());
    }

    #[test]
    fn test_concurrent_per_invocation_covers_every_value() {
        let provider = provider(100, ParameterProviderLevel::PerInvocation);
        let collected = std::sync::Mutex::new(Vec::new());

        crossbeam::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|_| {
                    let mut local = Vec::new();
                    for _ in 0..25 {
                        local.push(int(provider.get_value(&[]).unwrap()));
                    }
                    collected.lock().unwrap().extend(local);
                });
            }
        })
        .unwrap();

        let mut all = collected.into_inner().unwrap();
        all.sort_unstable();
        assert_eq!(all, (0..100).collect::<Vec<_>>());
    }
}
