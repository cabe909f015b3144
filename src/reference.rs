// 🔖 Reference Assignment
//
// A caller-supplied reference is used verbatim. Otherwise the reference is a
// name-based (MD5, version 3) UUID over the ISO date, byte-compatible with
// UUIDs derived from the same name bytes without a namespace.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::DATE_FORMAT;
use crate::error::{LedgerError, Result};

/// Upper bound on sequence suffixes tried for one day
const MAX_SEQUENCE: u32 = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceMode {
    /// Date-only name; a second reference-less submission on the same day collides
    Legacy,

    /// Date name, extended with `#n` until an unused reference is found
    #[default]
    Sequenced,
}

impl std::str::FromStr for ReferenceMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "legacy" => Ok(ReferenceMode::Legacy),
            "sequenced" => Ok(ReferenceMode::Sequenced),
            other => Err(format!("unknown reference mode: {}", other)),
        }
    }
}

/// Name-based UUID over the raw bytes of `name`
pub fn name_based_uuid(name: &str) -> Uuid {
    let digest = md5::compute(name.as_bytes());
    uuid::Builder::from_md5_bytes(digest.0).into_uuid()
}

/// Derive the reference for `date`; sequence 0 is the plain ISO date
pub fn derive_reference(date: NaiveDate, sequence: u32) -> String {
    let iso = date.format(DATE_FORMAT).to_string();
    let name = if sequence == 0 {
        iso
    } else {
        format!("{}#{}", iso, sequence)
    };

    name_based_uuid(&name).to_string()
}

/// Pick the reference for a new transaction
///
/// `is_taken` reports whether a candidate is already stored; it is only
/// consulted in `Sequenced` mode when no reference was supplied.
pub fn assign_reference<F>(
    supplied: Option<&str>,
    date: NaiveDate,
    mode: ReferenceMode,
    mut is_taken: F,
) -> Result<String>
where
    F: FnMut(&str) -> Result<bool>,
{
    if let Some(reference) = supplied.filter(|r| !r.is_empty()) {
        return Ok(reference.to_string());
    }

    match mode {
        ReferenceMode::Legacy => Ok(derive_reference(date, 0)),
        ReferenceMode::Sequenced => {
            for sequence in 0..MAX_SEQUENCE {
                let candidate = derive_reference(date, sequence);
                if !is_taken(&candidate)? {
                    return Ok(candidate);
                }
            }
            Err(LedgerError::InvalidRequest(format!(
                "no free reference left for {}",
                date.format(DATE_FORMAT)
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_derive_reference_is_name_based() {
        assert_eq!(
            derive_reference(day(2024, 1, 1), 0),
            "f867f4b1-ba30-3f4b-bed3-42c32b89110c"
        );
        assert_eq!(
            derive_reference(day(2026, 10, 16), 0),
            "40cc3e01-32e6-341c-b24a-0e2612b1577f"
        );
        assert_eq!(
            derive_reference(day(2026, 10, 16), 1),
            "4f19d485-40c4-3961-9433-da64abe2705b"
        );
    }

    #[test]
    fn test_derived_uuid_is_version_3() {
        let uuid = name_based_uuid("2024-01-01");
        assert_eq!(uuid.get_version_num(), 3);
        assert_eq!(uuid.get_variant(), uuid::Variant::RFC4122);
    }

    #[test]
    fn test_supplied_reference_used_verbatim() {
        let reference =
            assign_reference(Some("TxReference"), day(2024, 1, 1), ReferenceMode::Sequenced, |_| {
                Ok(true)
            })
            .unwrap();
        assert_eq!(reference, "TxReference");
    }

    #[test]
    fn test_empty_reference_is_derived() {
        for supplied in [None, Some("")] {
            let reference =
                assign_reference(supplied, day(2024, 1, 1), ReferenceMode::Legacy, |_| Ok(true))
                    .unwrap();
            assert_eq!(reference, "f867f4b1-ba30-3f4b-bed3-42c32b89110c");
        }
    }

    #[test]
    fn test_whitespace_reference_is_kept_verbatim() {
        let reference =
            assign_reference(Some("   "), day(2024, 1, 1), ReferenceMode::Sequenced, |_| Ok(false))
                .unwrap();
        assert_eq!(reference, "   ");
    }

    #[test]
    fn test_sequenced_mode_skips_taken_references() {
        let date = day(2026, 10, 16);
        let taken = vec![derive_reference(date, 0), derive_reference(date, 1)];

        let reference = assign_reference(None, date, ReferenceMode::Sequenced, |candidate| {
            Ok(taken.iter().any(|t| t == candidate))
        })
        .unwrap();

        assert_eq!(reference, derive_reference(date, 2));
    }

    #[test]
    fn test_first_sequenced_reference_matches_legacy() {
        let date = day(2026, 10, 16);
        let sequenced =
            assign_reference(None, date, ReferenceMode::Sequenced, |_| Ok(false)).unwrap();
        let legacy = assign_reference(None, date, ReferenceMode::Legacy, |_| Ok(false)).unwrap();
        assert_eq!(sequenced, legacy);
    }

    #[test]
    fn test_reference_mode_parsing() {
        assert_eq!("legacy".parse::<ReferenceMode>().unwrap(), ReferenceMode::Legacy);
        assert_eq!("SEQUENCED".parse::<ReferenceMode>().unwrap(), ReferenceMode::Sequenced);
        assert!("random".parse::<ReferenceMode>().is_err());
    }
}
