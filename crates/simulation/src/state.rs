use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use replenish_core::{ReplenishError, ReplenishResult};

use crate::params::SkuParameters;

/// Replenishment order in transit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineOrder {
    pub arrival_date: NaiveDate,
    pub quantity: i64,
}

/// What happened to one SKU on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayStep {
    pub date: NaiveDate,
    /// Demand drawn for the day.
    pub demand: u32,
    /// Units received from arriving orders.
    pub received: i64,
    /// Units sold (demand capped by stock).
    pub sold: u32,
    /// Stock at the end of the day.
    pub on_hand: i64,
    /// Order placed at the end-of-day review, if any.
    pub placed: Option<PipelineOrder>,
}

/// Mutable per-SKU simulation state.
///
/// Owned by a single SKU's loop and threaded through it day by day.
#[derive(Debug, Clone)]
pub struct SkuSimState {
    params: SkuParameters,
    on_hand: i64,
    pending: Vec<PipelineOrder>,
}

impl SkuSimState {
    /// Start fully stocked with nothing in transit.
    pub fn new(params: SkuParameters) -> Self {
        let on_hand = params.initial_on_hand();
        Self {
            params,
            on_hand,
            pending: Vec::new(),
        }
    }

    pub fn on_hand(&self) -> i64 {
        self.on_hand
    }

    pub fn pending(&self) -> &[PipelineOrder] {
        &self.pending
    }

    /// On-hand stock plus everything still in transit.
    pub fn inventory_position(&self) -> i64 {
        self.on_hand + self.pending.iter().map(|o| o.quantity).sum::<i64>()
    }

    /// Receive every order arriving on `date` and drop it from the pipeline.
    pub fn receive(&mut self, date: NaiveDate) -> i64 {
        let mut received = 0;
        self.pending.retain(|order| {
            if order.arrival_date == date {
                received += order.quantity;
                false
            } else {
                true
            }
        });
        self.on_hand += received;
        received
    }

    /// Sell up to `demand` units; unmet demand is lost.
    pub fn sell(&mut self, demand: u32) -> u32 {
        let sold = i64::from(demand).min(self.on_hand.max(0));
        self.on_hand -= sold;
        sold as u32
    }

    /// End-of-day review: order when the inventory position is at or below
    /// the trigger. Open orders do not block new ones.
    pub fn review(&mut self, date: NaiveDate) -> ReplenishResult<Option<PipelineOrder>> {
        if self.inventory_position() > self.params.reorder_point_threshold {
            return Ok(None);
        }
        let arrival_date = date
            .checked_add_days(Days::new(u64::from(self.params.lead_time_days)))
            .ok_or_else(|| {
                ReplenishError::invalid_config(format!(
                    "{}: arrival date after {date} is out of range",
                    self.params.sku_id
                ))
            })?;
        let order = PipelineOrder {
            arrival_date,
            quantity: self.params.order_quantity,
        };
        self.pending.push(order);
        Ok(Some(order))
    }

    /// Receive, sell, review.
    pub fn step(&mut self, date: NaiveDate, demand: u32) -> ReplenishResult<DayStep> {
        let received = self.receive(date);
        let sold = self.sell(demand);
        let placed = self.review(date)?;
        Ok(DayStep {
            date,
            demand,
            received,
            sold,
            on_hand: self.on_hand,
            placed,
        })
    }
}
