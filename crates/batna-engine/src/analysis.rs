use batna_models::{
    EstimationAccuracy, NegotiationMeta, SurplusAnalysis, SurplusBreakdown, ValueAnalysisReport,
};

/// Surplus figures for a finished negotiation. Everything is None without a deal.
pub fn surplus_analysis(
    final_price: Option<f64>,
    seller_batna: f64,
    buyer_batna: f64,
) -> SurplusAnalysis {
    let Some(price) = final_price else {
        return SurplusAnalysis::default();
    };

    let seller_surplus = price - seller_batna;
    let buyer_surplus = buyer_batna - price;
    let total = seller_surplus + buyer_surplus;
    let surplus_split = (total > 0.0).then(|| {
        format!(
            "{:.0}:{:.0}",
            seller_surplus / total * 100.0,
            buyer_surplus / total * 100.0
        )
    });

    SurplusAnalysis {
        seller_surplus: Some(seller_surplus),
        buyer_surplus: Some(buyer_surplus),
        total_surplus: Some(total),
        surplus_split,
    }
}

fn accuracy(true_batna: f64, supplied: f64, final_estimate: f64) -> EstimationAccuracy {
    let signed_error = supplied - true_batna;
    let absolute_error = signed_error.abs();
    let percent_error = (true_batna != 0.0).then(|| absolute_error / true_batna.abs() * 100.0);
    EstimationAccuracy {
        true_batna,
        supplied_estimate: supplied,
        final_estimate,
        signed_error,
        absolute_error,
        percent_error,
    }
}

/// Derive the value-capture view of a finished negotiation.
pub fn value_analysis(meta: &NegotiationMeta) -> ValueAnalysisReport {
    let zopa_width = meta.buyer_batna - meta.seller_batna;
    let surplus = &meta.post_negotiation_analysis;

    let shares = match (surplus.seller_surplus, surplus.buyer_surplus, surplus.total_surplus) {
        (Some(seller), Some(buyer), Some(total)) if total > 0.0 => {
            (Some(seller / total * 100.0), Some(buyer / total * 100.0))
        }
        _ => (None, None),
    };

    let deal_position_in_zopa = meta
        .final_price
        .filter(|_| zopa_width > 0.0)
        .map(|price| (price - meta.seller_batna) / zopa_width);

    ValueAnalysisReport {
        negotiation_id: meta.negotiation_id,
        outcome: meta.outcome,
        final_price: meta.final_price,
        zopa_width,
        buyer_estimation: accuracy(
            meta.buyer_batna,
            meta.initial_estimated_buyer_batna,
            meta.estimated_buyer_batna,
        ),
        seller_estimation: accuracy(
            meta.seller_batna,
            meta.initial_estimated_seller_batna,
            meta.estimated_seller_batna,
        ),
        surplus: SurplusBreakdown {
            seller_surplus: surplus.seller_surplus,
            buyer_surplus: surplus.buyer_surplus,
            total_surplus: surplus.total_surplus,
            seller_share_pct: shares.0,
            buyer_share_pct: shares.1,
            split_ratio: surplus.surplus_split.clone(),
            deal_position_in_zopa,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use batna_models::{Outcome, Profile, TerminationReason};
    use chrono::Utc;
    use uuid::Uuid;

    fn meta(final_price: Option<f64>) -> NegotiationMeta {
        NegotiationMeta {
            negotiation_id: Uuid::new_v4(),
            random_seed: 1,
            started_at: Utc::now(),
            completed_at: Utc::now(),
            starting_price: 500.0,
            buyer_batna: 550.0,
            seller_batna: 450.0,
            initial_estimated_buyer_batna: 520.0,
            initial_estimated_seller_batna: 480.0,
            estimated_buyer_batna: 530.0,
            estimated_seller_batna: 470.0,
            buyer_profile: Profile::Diplomat,
            seller_profile: Profile::Diplomat,
            outcome: if final_price.is_some() {
                Outcome::Deal
            } else {
                Outcome::NoDeal
            },
            final_price,
            total_rounds: 6,
            initial_month_to_key: 4,
            month_to_key: 3,
            termination_reason: TerminationReason::SellerAccepted,
            post_negotiation_analysis: surplus_analysis(final_price, 450.0, 550.0),
        }
    }

    #[test]
    fn surplus_for_deal() {
        let surplus = surplus_analysis(Some(510.0), 450.0, 550.0);
        assert_eq!(surplus.seller_surplus, Some(60.0));
        assert_eq!(surplus.buyer_surplus, Some(40.0));
        assert_eq!(surplus.total_surplus, Some(100.0));
        assert_eq!(surplus.surplus_split.as_deref(), Some("60:40"));
    }

    #[test]
    fn surplus_absent_without_deal() {
        assert_eq!(surplus_analysis(None, 450.0, 550.0), SurplusAnalysis::default());
    }

    #[test]
    fn no_split_for_non_positive_total() {
        let surplus = surplus_analysis(Some(500.0), 500.0, 500.0);
        assert_eq!(surplus.total_surplus, Some(0.0));
        assert!(surplus.surplus_split.is_none());
    }

    #[test]
    fn estimation_errors_use_supplied_values() {
        let report = value_analysis(&meta(Some(510.0)));
        assert_eq!(report.buyer_estimation.signed_error, -30.0);
        assert_eq!(report.buyer_estimation.absolute_error, 30.0);
        assert_eq!(report.buyer_estimation.final_estimate, 530.0);
        assert_eq!(report.seller_estimation.signed_error, 30.0);
        let pct = report.seller_estimation.percent_error.unwrap();
        assert!((pct - 30.0 / 450.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn deal_position_and_shares() {
        let report = value_analysis(&meta(Some(510.0)));
        assert_eq!(report.zopa_width, 100.0);
        assert_eq!(report.surplus.deal_position_in_zopa, Some(0.6));
        assert_eq!(report.surplus.seller_share_pct, Some(60.0));
        assert_eq!(report.surplus.buyer_share_pct, Some(40.0));
    }

    #[test]
    fn no_deal_report_has_empty_surplus() {
        let report = value_analysis(&meta(None));
        assert_eq!(report.surplus, SurplusBreakdown::default());
        assert_eq!(report.outcome, Outcome::NoDeal);
    }
}
