use replenish_core::{DailyRecord, ReplenishError, ReplenishResult};

/// Validate the raw table and put it in `(sku_id, date)` order.
///
/// Rejects rows with a non-positive lead time or negative stock, and
/// duplicate `(sku_id, date)` keys.
pub fn normalize(mut records: Vec<DailyRecord>) -> ReplenishResult<Vec<DailyRecord>> {
    for record in &records {
        record.validate()?;
    }
    records.sort_by_key(DailyRecord::key);
    if let Some(dup) = records.windows(2).find(|w| w[0].key() == w[1].key()) {
        return Err(ReplenishError::duplicate(dup[1].sku_id, dup[1].date));
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Days, NaiveDate};
    use replenish_core::SkuId;

    fn record(sku: u32, d: u64, on_hand: i64) -> DailyRecord {
        DailyRecord {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Days::new(d),
            sku_id: SkuId::from_index(sku),
            sales: 1,
            on_hand,
            lead_time_days: 4,
        }
    }

    #[test]
    fn sorts_by_sku_then_date() {
        let out = normalize(vec![record(2, 0, 5), record(1, 1, 5), record(1, 0, 5)]).unwrap();
        let keys: Vec<(u32, NaiveDate)> = out.iter().map(|r| (r.sku_id.index(), r.date)).collect();
        assert_eq!(keys[0].0, 1);
        assert!(keys[0].1 < keys[1].1);
        assert_eq!(keys[2].0, 2);
    }

    #[test]
    fn rejects_negative_stock() {
        assert!(matches!(
            normalize(vec![record(1, 0, -3)]),
            Err(ReplenishError::InvalidRecord(_))
        ));
    }

    #[test]
    fn rejects_duplicates() {
        assert!(matches!(
            normalize(vec![record(1, 0, 5), record(1, 0, 6)]),
            Err(ReplenishError::StateInconsistency { .. })
        ));
    }
}
