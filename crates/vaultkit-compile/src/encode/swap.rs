//! Router-style multi-route swap layout.

use super::Calldata;
use serde::{Deserialize, Serialize};
use vaultkit_core::{Felt, Uint256};

/// One hop of a multi-route swap.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// Token sold on this hop.
    pub sell_token: Felt,
    /// Token bought on this hop.
    pub buy_token: Felt,
    /// Exchange contract executing the hop.
    pub exchange_address: Felt,
    /// Share of the sell amount routed through this hop, in the
    /// router's own fixed-point percent denomination, never a 0-1
    /// fraction, never rescaled here.
    pub percent: Uint256,
    /// Exchange-specific extra parameters, carried verbatim.
    pub extra_params: Vec<Felt>,
}

/// A full multi-route swap. The beneficiary is supplied at encode time
/// (the compiler pins it to the vault).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiRouteSwap {
    /// Token being sold.
    pub sell_token: Felt,
    /// Amount sold.
    pub sell_amount: Uint256,
    /// Token being bought.
    pub buy_token: Felt,
    /// Expected buy amount.
    pub buy_amount: Uint256,
    /// Minimum acceptable buy amount.
    pub buy_min_amount: Uint256,
    /// Integrator fee in basis points; a single slot, not a magnitude.
    pub integrator_fee_bps: Felt,
    /// Recipient of the integrator fee.
    pub integrator_fee_recipient: Felt,
    /// Ordered routes; percents are interpreted by the router.
    pub routes: Vec<Route>,
}

/// multi_route_swap: sell token, sell amount, buy token, buy amount,
/// min buy amount, beneficiary, fee bps, fee recipient, then the
/// count-prefixed routes.
#[must_use]
pub fn multi_route_swap(swap: &MultiRouteSwap, beneficiary: Felt) -> Vec<Felt> {
    let mut cd = Calldata::new();
    cd.felt(swap.sell_token)
        .uint256(swap.sell_amount)
        .felt(swap.buy_token)
        .uint256(swap.buy_amount)
        .uint256(swap.buy_min_amount)
        .felt(beneficiary)
        .felt(swap.integrator_fee_bps)
        .felt(swap.integrator_fee_recipient)
        .count(swap.routes.len());
    for route in &swap.routes {
        cd.felt(route.sell_token)
            .felt(route.buy_token)
            .felt(route.exchange_address)
            .uint256(route.percent)
            .count(route.extra_params.len())
            .extend(&route.extra_params);
    }
    cd.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a(v: u64) -> Felt {
        Felt::from_u64(v)
    }

    fn sample_swap(routes: Vec<Route>) -> MultiRouteSwap {
        MultiRouteSwap {
            sell_token: a(1),
            sell_amount: Uint256::from_u64(100),
            buy_token: a(2),
            buy_amount: Uint256::from_u64(200),
            buy_min_amount: Uint256::from_u64(190),
            integrator_fee_bps: a(30),
            integrator_fee_recipient: a(3),
            routes,
        }
    }

    #[test]
    fn fixed_prefix_is_twelve_slots() {
        // 8 scalar/limb slots + beneficiary + fee bps + recipient + count.
        let slots = multi_route_swap(&sample_swap(vec![]), a(9));
        assert_eq!(slots.len(), 12);
        assert_eq!(slots[9], a(30)); // fee bps is a single slot
        assert_eq!(slots[11], Felt::ZERO); // route count
    }

    #[test]
    fn routes_are_count_prefixed_in_order() {
        let routes = vec![
            Route {
                sell_token: a(10),
                buy_token: a(11),
                exchange_address: a(12),
                percent: Uint256::from_u64(600),
                extra_params: vec![a(77)],
            },
            Route {
                sell_token: a(20),
                buy_token: a(21),
                exchange_address: a(22),
                percent: Uint256::from_u64(400),
                extra_params: vec![],
            },
        ];
        let slots = multi_route_swap(&sample_swap(routes), a(9));
        assert_eq!(slots[11], a(2));
        // First route: sell, buy, exchange, percent low/high, extras count, extra.
        assert_eq!(&slots[12..19], &[a(10), a(11), a(12), a(600), Felt::ZERO, a(1), a(77)]);
        // Second route follows immediately.
        assert_eq!(&slots[19..25], &[a(20), a(21), a(22), a(400), Felt::ZERO, Felt::ZERO]);
        assert_eq!(slots.len(), 25);
    }
}
