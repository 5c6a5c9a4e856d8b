//! Usernames
//!
//! A username config is a list or templated range bound to the fixed
//! parameter name `username`. Every thread needs its own user, so the
//! planner checks there are at least as many usernames as threads.

use super::range::{split_span, sub_ranges};
use super::{values_of, ParameterProviderLevel};
use crate::distribution::{bucket_offsets, even_load};
use crate::error::Error;
use crate::Result;
use serde::{Deserialize, Serialize};

/// Parameter name every username config serves
pub const USERNAME_PARAM: &str = "username";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum UsernameSource {
    List { values: Vec<String> },
    Range { template: String, start: i32, end: i32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsernameDataConfig {
    pub level: ParameterProviderLevel,
    pub source: UsernameSource,
}

impl UsernameDataConfig {
    pub fn from_list(values: Vec<String>) -> Self {
        Self {
            level: ParameterProviderLevel::PerThreadStatic,
            source: UsernameSource::List { values },
        }
    }

    /// Usernames rendered from `template` for every number in `[start, end]`
    pub fn from_range(template: impl Into<String>, start: i32, end: i32) -> Self {
        Self {
            level: ParameterProviderLevel::PerThreadStatic,
            source: UsernameSource::Range {
                template: template.into(),
                start,
                end,
            },
        }
    }

    /// Number of distinct usernames
    pub fn username_count(&self) -> u64 {
        match &self.source {
            UsernameSource::List { values } => values.len() as u64,
            UsernameSource::Range { start, end, .. } => split_span(*start, *end, 1).0,
        }
    }

    pub(crate) fn verify(&self) -> Result<()> {
        if self.username_count() == 0 {
            return Err(Error::config("No usernames are provided"));
        }
        Ok(())
    }

    /// Fail unless every one of `thread_count` threads can get its own user
    pub fn verify_enough_usernames(&self, thread_count: u32) -> Result<()> {
        let available = self.username_count();
        if available < thread_count as u64 {
            return Err(Error::config(format!(
                "Username Data Configurator provided only {} different user names while your thread pattern requires {}. \
                 You can either provide more user names or do not use a Username Data Configurator",
                available, thread_count
            )));
        }
        Ok(())
    }

    pub fn distribute(&self, agents: usize) -> Result<Vec<UsernameDataConfig>> {
        let not_enough = || Error::not_enough_for_agents(values_of(USERNAME_PARAM), self.username_count(), agents);

        let sources: Vec<UsernameSource> = match &self.source {
            UsernameSource::List { values } => {
                let sizes = even_load(values.len() as u64, agents);
                if sizes.is_empty() {
                    return Err(not_enough());
                }
                bucket_offsets(&sizes)
                    .into_iter()
                    .zip(&sizes)
                    .map(|(start, &size)| UsernameSource::List {
                        values: values[start as usize..(start + size) as usize].to_vec(),
                    })
                    .collect()
            }
            UsernameSource::Range { template, start, end } => {
                let (_, sizes) = split_span(*start, *end, agents);
                if sizes.is_empty() {
                    return Err(not_enough());
                }
                sub_ranges(*start, &sizes)
                    .into_iter()
                    .map(|(start, end)| UsernameSource::Range {
                        template: template.clone(),
                        start,
                        end,
                    })
                    .collect()
            }
        };

        Ok(sources
            .into_iter()
            .map(|source| Self {
                level: self.level,
                source,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(count: usize) -> Vec<String> {
        (0..count).map(|i| format!("user{}", i)).collect()
    }

    #[test]
    fn test_list_distribute() {
        let slices = UsernameDataConfig::from_list(names(5)).distribute(2).unwrap();
        assert_eq!(slices[0].source, UsernameSource::List { values: names(5)[..2].to_vec() });
        assert_eq!(slices[1].username_count(), 3);
    }

    #[test]
    fn test_range_distribute_last_absorbs_remainder() {
        let slices = UsernameDataConfig::from_range("user{0}", 1, 10).distribute(3).unwrap();
        let bounds: Vec<(i32, i32)> = slices
            .iter()
            .map(|s| match s.source {
                UsernameSource::Range { start, end, .. } => (start, end),
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(bounds, vec![(1, 3), (4, 6), (7, 10)]);
    }

    #[test]
    fn test_distribute_too_few() {
        let err = UsernameDataConfig::from_list(names(1)).distribute(2).unwrap_err();
        assert!(err.to_string().contains("parameter 'username'"));
    }

    #[test]
    fn test_verify_enough_usernames() {
        let config = UsernameDataConfig::from_range("user{0}", 1, 10);
        assert!(config.verify_enough_usernames(10).is_ok());
        let err = config.verify_enough_usernames(11).unwrap_err();
        assert!(err.to_string().contains("only 10 different user names"));
    }
}
