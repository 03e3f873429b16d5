use crate::shared::{db::models::Voucher, utils::round2};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PriceRange {
    pub min_volume: f64,
    #[serde(default)]
    pub max_volume: Option<f64>,
    pub price_per_unit: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PricingModel {
    Flat,
    Tiered,
}

impl PricingModel {
    pub fn parse(s: &str) -> Option<PricingModel> {
        match s {
            "flat" => Some(PricingModel::Flat),
            "tiered" => Some(PricingModel::Tiered),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PricingModel::Flat => "flat",
            PricingModel::Tiered => "tiered",
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RangeCharge {
    pub min_volume: f64,
    pub max_volume: Option<f64>,
    pub price_per_unit: f64,
    pub volume: f64,
    pub charge: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Bill {
    pub usage_volume: f64,
    pub usage_charge: f64,
    pub minimum_charge: f64,
    pub admin_fee: f64,
    pub total: f64,
    pub breakdown: Vec<RangeCharge>,
}

/// Ranges must be non-empty, non-negative, and non-overlapping once sorted.
/// Only the last range may be open-ended.
pub fn validate_ranges(ranges: &[PriceRange]) -> Result<(), String> {
    if ranges.is_empty() {
        return Err(String::from("At least one price range is required."));
    }
    let mut sorted: Vec<&PriceRange> = ranges.iter().collect();
    sorted.sort_by(|a, b| a.min_volume.total_cmp(&b.min_volume));

    for (i, range) in sorted.iter().enumerate() {
        if range.min_volume < 0.0 || range.price_per_unit < 0.0 {
            return Err(String::from("Volumes and prices must not be negative."));
        }
        match range.max_volume {
            Some(max) if max <= range.min_volume => {
                return Err(String::from("max_volume must be greater than min_volume."));
            }
            None if i + 1 != sorted.len() => {
                return Err(String::from("Only the last range may omit max_volume."));
            }
            _ => {}
        }
        if let (Some(next), Some(max)) = (sorted.get(i + 1), range.max_volume) {
            if next.min_volume < max {
                return Err(String::from("Price ranges must not overlap."));
            }
        }
    }
    Ok(())
}

pub fn usage_charge(model: PricingModel, ranges: &[PriceRange], volume: f64) -> (f64, Vec<RangeCharge>) {
    let volume = volume.max(0.0);
    match model {
        PricingModel::Flat => match ranges.first() {
            Some(range) => {
                let charge = volume * range.price_per_unit;
                let breakdown = vec![RangeCharge {
                    min_volume: range.min_volume,
                    max_volume: range.max_volume,
                    price_per_unit: range.price_per_unit,
                    volume,
                    charge: round2(charge),
                }];
                (charge, breakdown)
            }
            None => (0.0, Vec::new()),
        },
        PricingModel::Tiered => {
            let mut sorted: Vec<&PriceRange> = ranges.iter().collect();
            sorted.sort_by(|a, b| a.min_volume.total_cmp(&b.min_volume));

            let mut total = 0.0;
            let mut breakdown = Vec::new();
            for range in sorted {
                let upper = range.max_volume.unwrap_or(f64::INFINITY);
                let portion = (volume.min(upper) - range.min_volume).max(0.0);
                if portion <= 0.0 {
                    continue;
                }
                let charge = portion * range.price_per_unit;
                total += charge;
                breakdown.push(RangeCharge {
                    min_volume: range.min_volume,
                    max_volume: range.max_volume,
                    price_per_unit: range.price_per_unit,
                    volume: portion,
                    charge: round2(charge),
                });
            }
            (total, breakdown)
        }
    }
}

pub fn compute_bill(
    model: PricingModel,
    ranges: &[PriceRange],
    admin_fee: f64,
    minimum_charge: f64,
    volume: f64,
) -> Bill {
    let (charge, breakdown) = usage_charge(model, ranges, volume);
    Bill {
        usage_volume: volume,
        usage_charge: round2(charge),
        minimum_charge,
        admin_fee,
        total: round2(charge.max(minimum_charge) + admin_fee),
        breakdown,
    }
}

/// Cost of `additional` volume on top of `already_billed` this period.
pub fn marginal_cost(
    model: PricingModel,
    ranges: &[PriceRange],
    already_billed: f64,
    additional: f64,
) -> f64 {
    let before = usage_charge(model, ranges, already_billed).0;
    let after = usage_charge(model, ranges, already_billed + additional).0;
    round2((after - before).max(0.0))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscountType {
    Percentage,
    Fixed,
}

impl DiscountType {
    pub fn parse(s: &str) -> Option<DiscountType> {
        match s {
            "percentage" => Some(DiscountType::Percentage),
            "fixed" => Some(DiscountType::Fixed),
            _ => None,
        }
    }
}

/// Reason the voucher cannot be applied, or `None` when it can.
pub fn voucher_rejection(
    voucher: &Voucher,
    customer_uses: i64,
    amount: f64,
    now: NaiveDateTime,
) -> Option<String> {
    if voucher.status != "active" {
        return Some(String::from("Voucher is not active."));
    }
    if now < voucher.valid_from {
        return Some(String::from("Voucher is not yet valid."));
    }
    if now > voucher.valid_until {
        return Some(String::from("Voucher has expired."));
    }
    if let Some(limit) = voucher.usage_limit {
        if voucher.usage_count >= limit {
            return Some(String::from("Voucher usage limit has been reached."));
        }
    }
    if customer_uses >= i64::from(voucher.per_customer_limit) {
        return Some(String::from(
            "You have already used this voucher the maximum number of times.",
        ));
    }
    if amount < voucher.min_purchase_amount {
        return Some(format!(
            "Minimum purchase amount for this voucher is {:.2}.",
            voucher.min_purchase_amount
        ));
    }
    None
}

pub fn voucher_discount(voucher: &Voucher, amount: f64) -> f64 {
    let discount = match DiscountType::parse(&voucher.discount_type) {
        Some(DiscountType::Percentage) => {
            let raw = amount * voucher.discount_value / 100.0;
            match voucher.max_discount_amount {
                Some(cap) => raw.min(cap),
                None => raw,
            }
        }
        Some(DiscountType::Fixed) => voucher.discount_value.min(amount),
        None => 0.0,
    };
    round2(discount.max(0.0))
}

/// Reference tiers installed by the seed-defaults endpoint.
pub fn default_tiers() -> Vec<(&'static str, &'static str, Vec<PriceRange>, f64, f64)> {
    let range = |min: f64, max: Option<f64>, price: f64, label: &str| PriceRange {
        min_volume: min,
        max_volume: max,
        price_per_unit: price,
        description: Some(label.to_string()),
    };
    vec![
        (
            "Residential Standard",
            "residential",
            vec![
                range(0.0, Some(10.0), 1500.0, "Basic needs"),
                range(10.0, Some(20.0), 2500.0, "Normal usage"),
                range(20.0, None, 4000.0, "High usage"),
            ],
            10000.0,
            25000.0,
        ),
        (
            "Commercial Standard",
            "commercial",
            vec![
                range(0.0, Some(50.0), 3500.0, "Small business"),
                range(50.0, Some(200.0), 5000.0, "Medium business"),
                range(200.0, None, 7000.0, "Large business"),
            ],
            25000.0,
            100000.0,
        ),
        (
            "Industrial Standard",
            "industrial",
            vec![
                range(0.0, Some(500.0), 6000.0, "Light industry"),
                range(500.0, None, 8500.0, "Heavy industry"),
            ],
            50000.0,
            500000.0,
        ),
        (
            "Government Standard",
            "government",
            vec![range(0.0, None, 2000.0, "Flat government rate")],
            0.0,
            0.0,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn residential() -> Vec<PriceRange> {
        default_tiers().remove(0).2
    }

    fn voucher(discount_type: &str, value: f64) -> Voucher {
        let now = Utc::now().naive_utc();
        Voucher {
            id: 1,
            uuid: String::from("v"),
            code: String::from("HEMAT"),
            name: String::from("Hemat"),
            description: None,
            discount_type: discount_type.to_string(),
            discount_value: value,
            max_discount_amount: None,
            min_purchase_amount: 0.0,
            usage_limit: None,
            usage_count: 0,
            per_customer_limit: 1,
            valid_from: now - Duration::days(1),
            valid_until: now + Duration::days(1),
            status: String::from("active"),
            metadata: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn tiered_charge_sums_each_band() {
        let (charge, breakdown) = usage_charge(PricingModel::Tiered, &residential(), 25.0);
        // 10*1500 + 10*2500 + 5*4000
        assert_eq!(charge, 60000.0);
        assert_eq!(breakdown.len(), 3);
        assert_eq!(breakdown[2].volume, 5.0);
    }

    #[test]
    fn flat_charge_uses_first_range_price() {
        let (charge, breakdown) = usage_charge(PricingModel::Flat, &residential(), 25.0);
        assert_eq!(charge, 37500.0);
        assert_eq!(breakdown.len(), 1);
    }

    #[test]
    fn bill_applies_minimum_then_admin_fee() {
        let bill = compute_bill(PricingModel::Tiered, &residential(), 10000.0, 25000.0, 5.0);
        assert_eq!(bill.usage_charge, 7500.0);
        assert_eq!(bill.total, 35000.0);

        let bill = compute_bill(PricingModel::Tiered, &residential(), 10000.0, 25000.0, 25.0);
        assert_eq!(bill.total, 70000.0);
    }

    #[test]
    fn marginal_cost_crosses_band_boundary() {
        // 8 already billed, 4 more: 2 at 1500 + 2 at 2500
        let cost = marginal_cost(PricingModel::Tiered, &residential(), 8.0, 4.0);
        assert_eq!(cost, 8000.0);
    }

    #[test]
    fn overlapping_ranges_are_rejected() {
        let mut ranges = residential();
        ranges[1].min_volume = 5.0;
        assert!(validate_ranges(&ranges).is_err());
        assert!(validate_ranges(&[]).is_err());
        assert!(validate_ranges(&residential()).is_ok());
    }

    #[test]
    fn open_range_must_be_last() {
        let ranges = vec![
            PriceRange { min_volume: 0.0, max_volume: None, price_per_unit: 1.0, description: None },
            PriceRange { min_volume: 10.0, max_volume: Some(20.0), price_per_unit: 2.0, description: None },
        ];
        assert!(validate_ranges(&ranges).is_err());
    }

    #[test]
    fn percentage_discount_is_capped() {
        let mut v = voucher("percentage", 20.0);
        assert_eq!(voucher_discount(&v, 100000.0), 20000.0);
        v.max_discount_amount = Some(15000.0);
        assert_eq!(voucher_discount(&v, 100000.0), 15000.0);
    }

    #[test]
    fn fixed_discount_never_exceeds_amount() {
        let v = voucher("fixed", 50000.0);
        assert_eq!(voucher_discount(&v, 30000.0), 30000.0);
    }

    #[test]
    fn voucher_validity_rules() {
        let now = Utc::now().naive_utc();
        let mut v = voucher("fixed", 1000.0);
        assert!(voucher_rejection(&v, 0, 5000.0, now).is_none());
        assert!(voucher_rejection(&v, 1, 5000.0, now).is_some());

        v.usage_limit = Some(3);
        v.usage_count = 3;
        assert!(voucher_rejection(&v, 0, 5000.0, now).is_some());

        let mut v = voucher("fixed", 1000.0);
        v.min_purchase_amount = 10000.0;
        assert!(voucher_rejection(&v, 0, 5000.0, now).is_some());

        let mut v = voucher("fixed", 1000.0);
        v.valid_until = now - Duration::hours(1);
        assert_eq!(
            voucher_rejection(&v, 0, 5000.0, now).as_deref(),
            Some("Voucher has expired.")
        );

        let mut v = voucher("fixed", 1000.0);
        v.status = String::from("inactive");
        assert!(voucher_rejection(&v, 0, 5000.0, now).is_some());
    }
}
