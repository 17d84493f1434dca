//! Bilateral trade clearing across a single link.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::MarketConfig;
use crate::diet::{capacity, marginal_capacity};
use crate::numeric::{argmax, argmin};
use crate::product::{Product, ProductMap};
use crate::tile::TileId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LinkId(pub u32);

/// Goods moved in one direction in return for goods moved in the other.
/// Amounts are what each sender gave up; receivers get them net of cost.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Exchange {
    pub from: TileId,
    pub to: TileId,
    pub sent: Product,
    pub sent_amount: f64,
    pub returned: Product,
    pub returned_amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeLink {
    pub id: LinkId,
    /// Lower tile id.
    pub a: TileId,
    pub b: TileId,
    pub river: bool,
    pub costs: ProductMap,
    pub exchanges: Vec<Exchange>,
    pub notes: Vec<String>,
}

impl TradeLink {
    pub fn new(
        id: LinkId,
        first: TileId,
        second: TileId,
        river: bool,
        config: &MarketConfig,
    ) -> Self {
        let (a, b) = if first <= second {
            (first, second)
        } else {
            (second, first)
        };
        let factor = if river { config.river_cost_factor } else { 1.0 };
        let costs =
            ProductMap::from_fn(|p| (config.transaction_costs[p] * factor).clamp(0.0, 1.0));
        Self {
            id,
            a,
            b,
            river,
            costs,
            exchanges: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn other(&self, tile: TileId) -> Option<TileId> {
        if tile == self.a {
            Some(self.b)
        } else if tile == self.b {
            Some(self.a)
        } else {
            None
        }
    }

    pub fn reset(&mut self) {
        self.exchanges.clear();
        self.notes.clear();
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClearingReport {
    pub exchanges: Vec<Exchange>,
    pub notes: Vec<String>,
    pub iterations: usize,
}

struct Proposal {
    give: Product,
    want: Product,
    give_amount: f64,
    want_amount: f64,
}

struct Side<'b> {
    tile: TileId,
    basket: &'b mut ProductMap,
}

pub struct TradeMarket<'a> {
    config: &'a MarketConfig,
}

impl<'a> TradeMarket<'a> {
    pub fn new(config: &'a MarketConfig) -> Self {
        Self { config }
    }

    fn marginals(&self, basket: &ProductMap) -> [f64; Product::COUNT] {
        let mut out = [0.0; Product::COUNT];
        for product in Product::ALL {
            out[product.index()] = marginal_capacity(basket, product, self.config.marginal_delta);
        }
        out
    }

    /// What the proposer would offer, priced at the geometric mean of both
    /// sides' marginal rates of substitution.
    fn propose(&self, proposer: &ProductMap, partner: &ProductMap) -> Option<Proposal> {
        let mine = self.marginals(proposer);
        let held: Vec<f64> = Product::ALL
            .iter()
            .map(|p| {
                if proposer[*p] > 0.0 {
                    mine[p.index()]
                } else {
                    f64::INFINITY
                }
            })
            .collect();
        let wanted: Vec<f64> = Product::ALL
            .iter()
            .map(|p| {
                if partner[*p] > 0.0 {
                    mine[p.index()]
                } else {
                    f64::NEG_INFINITY
                }
            })
            .collect();
        let give = Product::ALL[argmin(&held)?];
        let want = Product::ALL[argmax(&wanted)?];
        if give == want || !held[give.index()].is_finite() || !wanted[want.index()].is_finite() {
            return None;
        }
        let theirs = self.marginals(partner);
        if mine[want.index()] <= 0.0 || theirs[want.index()] <= 0.0 {
            return None;
        }
        let mrs_mine = mine[give.index()] / mine[want.index()];
        let mrs_theirs = theirs[give.index()] / theirs[want.index()];
        let ratio = (mrs_mine * mrs_theirs).max(0.0).sqrt();
        if ratio <= 0.0 || !ratio.is_finite() {
            return None;
        }

        let mut give_amount = self.config.lot_size.min(proposer[give]);
        let mut want_amount = give_amount * ratio;
        let partner_stock = partner[want].max(0.0);
        if want_amount > partner_stock {
            want_amount = partner_stock;
            give_amount = want_amount / ratio;
        }
        if give_amount <= 0.0 || want_amount <= 0.0 {
            return None;
        }
        Some(Proposal {
            give,
            want,
            give_amount,
            want_amount,
        })
    }

    /// Tries one proposal; returns the exchange if both sides gained.
    fn attempt(
        &self,
        costs: &ProductMap,
        proposer: &mut Side<'_>,
        partner: &mut Side<'_>,
        notes: &mut Vec<String>,
    ) -> Option<Exchange> {
        let offer = self.propose(proposer.basket, partner.basket)?;

        let mut proposer_after = *proposer.basket;
        proposer_after[offer.give] -= offer.give_amount;
        proposer_after[offer.want] += offer.want_amount * (1.0 - costs[offer.want]);
        let mut partner_after = *partner.basket;
        partner_after[offer.want] -= offer.want_amount;
        partner_after[offer.give] += offer.give_amount * (1.0 - costs[offer.give]);

        let proposer_gain = capacity(&proposer_after) - capacity(proposer.basket);
        let partner_gain = capacity(&partner_after) - capacity(partner.basket);

        if proposer_gain > 0.0 && partner_gain > 0.0 {
            *proposer.basket = proposer_after.clamped();
            *partner.basket = partner_after.clamped();
            return Some(Exchange {
                from: proposer.tile,
                to: partner.tile,
                sent: offer.give,
                sent_amount: offer.give_amount,
                returned: offer.want,
                returned_amount: offer.want_amount,
            });
        }

        if (proposer_gain > 0.0 || partner_gain > 0.0) && notes.len() < self.config.note_limit {
            let winner = if proposer_gain > 0.0 {
                proposer.tile
            } else {
                partner.tile
            };
            let note = format!(
                "{:?} offering {:.2} {} for {:.2} {} only helps {:?}",
                proposer.tile,
                offer.give_amount,
                offer.give.label(),
                offer.want_amount,
                offer.want.label(),
                winner
            );
            trace!(note = %note, "one-sided trade skipped");
            notes.push(note);
        }
        None
    }

    /// Clears the link until neither side can propose a mutually beneficial
    /// lot or the iteration cap is reached. Side `a` proposes first.
    pub fn clear(
        &self,
        link: &TradeLink,
        basket_a: &mut ProductMap,
        basket_b: &mut ProductMap,
    ) -> ClearingReport {
        let mut report = ClearingReport::default();
        let mut side_a = Side {
            tile: link.a,
            basket: basket_a,
        };
        let mut side_b = Side {
            tile: link.b,
            basket: basket_b,
        };

        while report.iterations < self.config.max_iterations {
            report.iterations += 1;
            let mut executed = false;
            let notes = &mut report.notes;
            if let Some(ex) = self.attempt(&link.costs, &mut side_a, &mut side_b, notes) {
                merge(&mut report.exchanges, ex);
                executed = true;
            }
            if let Some(ex) = self.attempt(&link.costs, &mut side_b, &mut side_a, notes) {
                merge(&mut report.exchanges, ex);
                executed = true;
            }
            if !executed {
                break;
            }
        }
        report
    }
}

fn merge(exchanges: &mut Vec<Exchange>, ex: Exchange) {
    if let Some(existing) = exchanges
        .iter_mut()
        .find(|e| e.from == ex.from && e.sent == ex.sent && e.returned == ex.returned)
    {
        existing.sent_amount += ex.sent_amount;
        existing.returned_amount += ex.returned_amount;
    } else {
        exchanges.push(ex);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basket(grain: f64, herds: f64) -> ProductMap {
        ProductMap::from_fn(|p| match p {
            Product::Grain => grain,
            Product::Herds => herds,
            Product::Construction => 0.0,
        })
    }

    fn link(config: &MarketConfig, river: bool) -> TradeLink {
        TradeLink::new(LinkId(0), TileId(1), TileId(0), river, config)
    }

    #[test]
    fn link_orders_endpoints_and_discounts_rivers() {
        let config = MarketConfig::default();
        let dry = link(&config, false);
        let wet = link(&config, true);
        assert_eq!(dry.a, TileId(0));
        assert_eq!(dry.other(TileId(0)), Some(TileId(1)));
        assert_eq!(dry.other(TileId(7)), None);
        assert!((wet.costs[Product::Grain] - dry.costs[Product::Grain] * 0.5).abs() < 1e-12);
    }

    #[test]
    fn complementary_baskets_trade_to_mutual_gain() {
        let config = MarketConfig::default();
        let market = TradeMarket::new(&config);
        let link = link(&config, true);
        let mut farmer = basket(600.0, 150.0);
        let mut herder = basket(200.0, 500.0);
        let before = (capacity(&farmer), capacity(&herder));
        let report = market.clear(&link, &mut farmer, &mut herder);
        assert!(!report.exchanges.is_empty());
        assert!(capacity(&farmer) > before.0);
        assert!(capacity(&herder) > before.1);
        assert!(!farmer.has_negative() && !herder.has_negative());
        assert!(report.iterations <= config.max_iterations);
    }

    #[test]
    fn identical_baskets_do_not_trade() {
        let config = MarketConfig::default();
        let market = TradeMarket::new(&config);
        let link = link(&config, false);
        let mut left = basket(500.0, 300.0);
        let mut right = basket(500.0, 300.0);
        let report = market.clear(&link, &mut left, &mut right);
        assert!(report.exchanges.is_empty());
        assert_eq!(left, right);
    }

    #[test]
    fn clearing_is_deterministic() {
        let config = MarketConfig::default();
        let market = TradeMarket::new(&config);
        let link = link(&config, false);
        let run = || {
            let mut a = basket(800.0, 60.0);
            let mut b = basket(100.0, 400.0);
            market.clear(&link, &mut a, &mut b).exchanges
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn receiver_gets_amount_net_of_cost() {
        let config = MarketConfig::default();
        let market = TradeMarket::new(&config);
        let link = link(&config, false);
        let mut a = basket(600.0, 150.0);
        let mut b = basket(200.0, 500.0);
        let total_before = a.food_total() + b.food_total();
        let report = market.clear(&link, &mut a, &mut b);
        let lost: f64 = report
            .exchanges
            .iter()
            .map(|e| {
                e.sent_amount * link.costs[e.sent] + e.returned_amount * link.costs[e.returned]
            })
            .sum();
        let total_after = a.food_total() + b.food_total();
        assert!((total_before - lost - total_after).abs() < 1e-6);
    }

    #[test]
    fn one_sided_offers_leave_a_note_and_move_nothing() {
        // Grain all but vanishes in transit, so whoever receives it loses.
        let config = MarketConfig {
            transaction_costs: ProductMap::from_fn(|p| match p {
                Product::Grain => 0.95,
                _ => 0.0,
            }),
            ..MarketConfig::default()
        };
        let market = TradeMarket::new(&config);
        let link = link(&config, false);
        let mut farmer = basket(600.0, 150.0);
        let mut herder = basket(200.0, 500.0);
        let report = market.clear(&link, &mut farmer, &mut herder);

        assert!(report.exchanges.is_empty());
        assert!(!report.notes.is_empty());
        assert!(report.notes.len() <= config.note_limit);
        assert!(report.notes[0].contains("only helps"));
        assert_eq!(farmer, basket(600.0, 150.0));
        assert_eq!(herder, basket(200.0, 500.0));
    }
}
