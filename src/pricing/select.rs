//! Choosing a print method for objects the customer left on "auto".
//!
//! Small or colorful artwork goes to DTF, which costs the same per piece at
//! any quantity. Screen printing only wins when the artwork is large, uses
//! few inks, and the order is big enough to amortize the screens; the policy
//! thresholds decide what counts as each.

use canvas::scene::PrintMethod;

use crate::catalog::PricingTable;
use crate::config::AutoSelectPolicy;

/// The method an object is priced with, and whether it was chosen for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodChoice {
    pub method: PrintMethod,
    pub auto_selected: bool,
}

/// Explicit overrides always win. Otherwise apply `policy`.
///
/// `colors == 0` means the colors are unknown (an unloaded bitmap), which
/// never qualifies for bulk.
#[must_use]
pub fn effective_method(
    explicit: Option<PrintMethod>,
    colors: usize,
    area_mm2: f64,
    quantity: u32,
    policy: &AutoSelectPolicy,
    table: &PricingTable,
) -> MethodChoice {
    if let Some(method) = explicit {
        return MethodChoice { method, auto_selected: false };
    }
    let bulk = colors > 0
        && colors <= policy.max_bulk_colors
        && quantity >= policy.min_bulk_quantity
        && area_mm2 >= policy.min_bulk_area_mm2
        && table.has(PrintMethod::ScreenPrinting);
    let method = if bulk { PrintMethod::ScreenPrinting } else { PrintMethod::Dtf };
    MethodChoice { method, auto_selected: true }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::BulkPricing;

    fn table() -> PricingTable {
        PricingTable { screen_printing: Some(BulkPricing::flat(20_000.0, 50, 100.0)), ..PricingTable::default() }
    }

    fn auto(colors: usize, area: f64, quantity: u32) -> PrintMethod {
        effective_method(None, colors, area, quantity, &AutoSelectPolicy::default(), &table()).method
    }

    #[test]
    fn explicit_override_wins() {
        let choice =
            effective_method(Some(PrintMethod::Applique), 12, 1.0, 1, &AutoSelectPolicy::default(), &table());
        assert_eq!(choice, MethodChoice { method: PrintMethod::Applique, auto_selected: false });
    }

    #[test]
    fn small_artwork_goes_to_dtf() {
        assert_eq!(auto(1, 500.0, 500), PrintMethod::Dtf);
    }

    #[test]
    fn large_simple_high_volume_goes_to_screen_printing() {
        assert_eq!(auto(2, 40_000.0, 200), PrintMethod::ScreenPrinting);
    }

    #[test]
    fn too_many_colors_stays_dtf() {
        assert_eq!(auto(9, 40_000.0, 200), PrintMethod::Dtf);
    }

    #[test]
    fn low_quantity_stays_dtf() {
        assert_eq!(auto(2, 40_000.0, 10), PrintMethod::Dtf);
    }

    #[test]
    fn unknown_colors_stay_dtf() {
        assert_eq!(auto(0, 40_000.0, 200), PrintMethod::Dtf);
    }

    #[test]
    fn unpriced_screen_printing_is_never_chosen() {
        let choice = effective_method(None, 1, 40_000.0, 500, &AutoSelectPolicy::default(), &PricingTable::default());
        assert_eq!(choice.method, PrintMethod::Dtf);
        assert!(choice.auto_selected);
    }

    #[test]
    fn thresholds_are_policy() {
        let policy = AutoSelectPolicy { max_bulk_colors: 1, min_bulk_quantity: 5, min_bulk_area_mm2: 100.0 };
        let choice = effective_method(None, 1, 150.0, 5, &policy, &table());
        assert_eq!(choice.method, PrintMethod::ScreenPrinting);
    }
}
