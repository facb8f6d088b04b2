//! View-state ordering of the service snapshot.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::models::ServiceUnit;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Name,
    Status,
    Enabled,
    Description,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::Status => "status",
            SortField::Enabled => "enabled",
            SortField::Description => "description",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "name" => Ok(SortField::Name),
            "status" => Ok(SortField::Status),
            "enabled" => Ok(SortField::Enabled),
            "description" => Ok(SortField::Description),
            other => Err(format!(
                "unknown sort field: {other}. Try: name, status, enabled, description"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    fn flipped(self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortOrder::Ascending => "ascending",
            SortOrder::Descending => "descending",
        })
    }
}

/// Active ordering of the list view. Not persisted and never sent to the
/// API; the ordered view is recomputed from the snapshot on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortDirective {
    pub field: SortField,
    pub order: SortOrder,
}

impl Default for SortDirective {
    fn default() -> Self {
        SortDirective {
            field: SortField::Name,
            order: SortOrder::Ascending,
        }
    }
}

impl SortDirective {
    /// Selecting the active field again flips the order; selecting a new
    /// field resets it to ascending.
    pub fn toggle(&mut self, field: SortField) {
        if self.field == field {
            self.order = self.order.flipped();
        } else {
            self.field = field;
            self.order = SortOrder::Ascending;
        }
    }
}

/// Stable comparator for the directive. String fields compare
/// case-insensitively. The enabled field partitions enabled rows before
/// disabled rows no matter which order is requested; the requested order
/// only reverses the within-partition tiebreak on the raw representation.
pub(crate) fn compare(a: &ServiceUnit, b: &ServiceUnit, directive: &SortDirective) -> Ordering {
    match directive.field {
        SortField::Name => directive.order.apply(fold_cmp(&a.name, &b.name)),
        SortField::Status => directive.order.apply(fold_cmp(&a.status, &b.status)),
        SortField::Description => directive
            .order
            .apply(fold_cmp(&a.description, &b.description)),
        SortField::Enabled => match (a.enabled.on, b.enabled.on) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => directive.order.apply(a.enabled.raw.cmp(&b.enabled.raw)),
        },
    }
}

fn fold_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EnabledRepr, Enablement, UnitDetails};

    fn unit(name: &str, status: &str, enabled: EnabledRepr, description: &str) -> ServiceUnit {
        ServiceUnit {
            name: name.to_string(),
            status: status.to_string(),
            enabled: Enablement::from(enabled),
            description: description.to_string(),
            details: UnitDetails::Empty,
        }
    }

    fn fixture() -> Vec<ServiceUnit> {
        vec![
            unit("nginx", "active", EnabledRepr::Text("enabled".into()), "web server"),
            unit("Backup", "inactive", EnabledRepr::Text("disabled".into()), "nightly backup"),
            unit("sshd", "active", EnabledRepr::Flag(true), "openssh daemon"),
            unit("cron", "failed", EnabledRepr::Text("static".into()), ""),
            unit("acpid", "inactive", EnabledRepr::Flag(false), "power events"),
        ]
    }

    fn sort(units: &[ServiceUnit], directive: &SortDirective) -> Vec<ServiceUnit> {
        let mut sorted = units.to_vec();
        sorted.sort_by(|a, b| compare(a, b, directive));
        sorted
    }

    fn names(units: &[ServiceUnit]) -> Vec<&str> {
        units.iter().map(|u| u.name.as_str()).collect()
    }

    #[test]
    fn name_sort_is_case_insensitive() {
        let directive = SortDirective::default();
        let sorted = sort(&fixture(), &directive);
        assert_eq!(names(&sorted), ["acpid", "Backup", "cron", "nginx", "sshd"]);
    }

    #[test]
    fn sort_is_idempotent_and_a_permutation() {
        let units = fixture();
        for field in [
            SortField::Name,
            SortField::Status,
            SortField::Enabled,
            SortField::Description,
        ] {
            for order in [SortOrder::Ascending, SortOrder::Descending] {
                let directive = SortDirective { field, order };
                let once = sort(&units, &directive);
                let twice = sort(&once, &directive);
                assert_eq!(names(&once), names(&twice), "{field} {order} not idempotent");

                let mut expected: Vec<&str> = names(&units);
                let mut got: Vec<&str> = names(&once);
                expected.sort();
                got.sort();
                assert_eq!(expected, got, "{field} {order} lost or duplicated rows");
            }
        }
    }

    #[test]
    fn enabled_rows_precede_disabled_in_both_directions() {
        let units = fixture();
        for order in [SortOrder::Ascending, SortOrder::Descending] {
            let directive = SortDirective {
                field: SortField::Enabled,
                order,
            };
            let sorted = sort(&units, &directive);
            let first_disabled = sorted.iter().position(|u| !u.enabled.on).unwrap();
            assert!(
                sorted[first_disabled..].iter().all(|u| !u.enabled.on),
                "partition boundary violated for {order}"
            );
        }
    }

    #[test]
    fn enabled_tiebreak_follows_requested_order() {
        let units = fixture();
        let asc = sort(
            &units,
            &SortDirective {
                field: SortField::Enabled,
                order: SortOrder::Ascending,
            },
        );
        // Both enabled: raw "enabled" vs raw "true".
        assert_eq!(names(&asc)[..2], ["nginx", "sshd"]);
        // Disabled partition: raw "disabled" < "false" < "static".
        assert_eq!(names(&asc)[2..], ["Backup", "acpid", "cron"]);

        let desc = sort(
            &units,
            &SortDirective {
                field: SortField::Enabled,
                order: SortOrder::Descending,
            },
        );
        assert_eq!(names(&desc)[..2], ["sshd", "nginx"]);
        assert_eq!(names(&desc)[2..], ["cron", "acpid", "Backup"]);
    }

    #[test]
    fn missing_description_sorts_as_empty_string() {
        let directive = SortDirective {
            field: SortField::Description,
            order: SortOrder::Ascending,
        };
        let sorted = sort(&fixture(), &directive);
        assert_eq!(names(&sorted)[0], "cron");
    }

    #[test]
    fn toggle_same_field_flips_new_field_resets() {
        let mut directive = SortDirective::default();

        directive.toggle(SortField::Name);
        assert_eq!(directive.order, SortOrder::Descending);
        directive.toggle(SortField::Name);
        assert_eq!(directive.order, SortOrder::Ascending);

        directive.toggle(SortField::Name);
        directive.toggle(SortField::Status);
        assert_eq!(directive.field, SortField::Status);
        assert_eq!(directive.order, SortOrder::Ascending);
    }

    #[test]
    fn sort_field_parses_from_cli_input() {
        assert_eq!("Enabled".parse::<SortField>().unwrap(), SortField::Enabled);
        assert!("uptime".parse::<SortField>().is_err());
    }
}
