//! Daily capacity computations over a visit snapshot
//!
//! Always recomputed from the full snapshot handed in: the visit set changes
//! under other sessions between calls, so nothing here is cached.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::models::Visit;

/// Number of visits scheduled on each date
pub fn daily_counts(visits: &[Visit]) -> BTreeMap<NaiveDate, usize> {
    let mut counts = BTreeMap::new();
    for visit in visits {
        *counts.entry(visit.visit_date).or_insert(0) += 1;
    }
    counts
}

/// Dates whose visit count has reached `cap`
pub fn saturated_dates(visits: &[Visit], cap: usize) -> BTreeSet<NaiveDate> {
    daily_counts(visits)
        .into_iter()
        .filter(|&(_, count)| count >= cap)
        .map(|(date, _)| date)
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{NewVisit, VisitStatus};
    use chrono::{NaiveTime, Utc};

    pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub(crate) fn new_visit(organizer_id: i32, visit_date: NaiveDate) -> NewVisit {
        NewVisit {
            visit_date,
            organizer_id,
            organizer_name: format!("Universidad {}", organizer_id),
            rbd: 8485,
            school_name: "Liceo de Aplicación".to_string(),
            district_code: Some(13101),
            address: None,
            start_time: NaiveTime::MIN,
            end_time: NaiveTime::MIN,
            install_time: NaiveTime::MIN,
            contact_name: None,
            contact_phone: None,
            contact_email: None,
            contact_role: None,
            counselor_name: None,
            counselor_phone: None,
            counselor_email: None,
            status: VisitStatus::Confirmed,
            notes: None,
        }
    }

    pub(crate) fn visit(id: i32, visit_date: NaiveDate) -> Visit {
        new_visit(1, visit_date).into_visit(id, None, Utc::now())
    }

    #[test]
    fn test_empty_snapshot_has_no_saturated_dates() {
        assert!(saturated_dates(&[], 3).is_empty());
    }

    #[test]
    fn test_three_visits_saturate_date() {
        let busy = date(2024, 4, 10);
        let visits = vec![visit(1, busy), visit(2, busy), visit(3, busy)];
        let saturated = saturated_dates(&visits, 3);
        assert!(saturated.contains(&busy));
        assert!(!saturated.contains(&date(2024, 4, 11)));
    }

    #[test]
    fn test_membership_matches_counts() {
        let visits = vec![
            visit(1, date(2024, 5, 2)),
            visit(2, date(2024, 5, 2)),
            visit(3, date(2024, 5, 3)),
            visit(4, date(2024, 5, 2)),
            visit(5, date(2024, 5, 3)),
            visit(6, date(2024, 5, 7)),
        ];
        let counts = daily_counts(&visits);
        assert_eq!(counts[&date(2024, 5, 2)], 3);
        assert_eq!(counts[&date(2024, 5, 3)], 2);

        for cap in 1..=4 {
            let saturated = saturated_dates(&visits, cap);
            for (day, count) in &counts {
                assert_eq!(saturated.contains(day), *count >= cap, "cap {} day {}", cap, day);
            }
            assert!(saturated.iter().all(|d| counts.contains_key(d)));
        }
    }

    #[test]
    fn test_saturated_dates_is_idempotent() {
        let visits = vec![visit(1, date(2024, 6, 4)), visit(2, date(2024, 6, 4))];
        assert_eq!(saturated_dates(&visits, 2), saturated_dates(&visits, 2));
    }
}
