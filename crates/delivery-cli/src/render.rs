//! Plain-text tables for `--format table`.

use std::io::{self, Write};

use delivery_core::models::{PriceQuote, RestaurantMenus, UserSubscription};
use delivery_core::{Cart, SubscriptionState, SubscriptionStatus};
use delivery_services::PlanOffer;

use crate::truncate_string;

pub fn restaurants(out: &mut impl Write, restaurants: &[RestaurantMenus]) -> io::Result<()> {
    if restaurants.is_empty() {
        writeln!(out, "No restaurants found.")?;
        return Ok(());
    }

    for entry in restaurants {
        let restaurant = &entry.restaurant_dto;
        writeln!(out, "\n=== {} ===", restaurant.name)?;
        if let Some(address) = &restaurant.address {
            writeln!(out, "{}", address)?;
        }
        if entry.menu_dtos.is_empty() {
            writeln!(out, "  (no menu items)")?;
            continue;
        }

        writeln!(
            out,
            "{:<8} {:<28} {:>10} {:<10} {}",
            "ID", "Name", "Price", "Available", "Ingredients"
        )?;
        writeln!(out, "{}", "-".repeat(90))?;
        for item in &entry.menu_dtos {
            writeln!(
                out,
                "{:<8} {:<28} {:>10.2} {:<10} {}",
                item.id,
                truncate_string(&item.name, 28),
                item.price,
                if item.is_available { "yes" } else { "no" },
                truncate_string(&item.ingredient_list(), 40)
            )?;
        }
    }
    writeln!(out)
}

pub fn offers(out: &mut impl Write, offers: &[PlanOffer<'_>]) -> io::Result<()> {
    if offers.is_empty() {
        writeln!(out, "No plans available.")?;
        return Ok(());
    }

    writeln!(
        out,
        "{:<6} {:<20} {:<10} {:>10}  {}",
        "ID", "Plan", "Period", "Price", "Status"
    )?;
    writeln!(out, "{}", "-".repeat(80))?;
    for offer in offers {
        let status = if offer.eligibility.is_allowed() {
            "available"
        } else {
            offer.eligibility.reason()
        };
        writeln!(
            out,
            "{:<6} {:<20} {:<10} {:>10.2}  {}",
            offer.plan.id,
            truncate_string(&offer.plan.name.display_name(), 20),
            offer.plan.type_subscription.as_str(),
            offer.plan.price,
            status
        )?;
        if let Some(description) = &offer.plan.description {
            writeln!(out, "{:<6} {}", "", truncate_string(description, 70))?;
        }
    }
    Ok(())
}

fn state_label(state: SubscriptionState) -> &'static str {
    match state {
        SubscriptionState::Upcoming => "upcoming",
        SubscriptionState::Active => "active",
        SubscriptionState::ExpiringSoon => "expiring soon",
        SubscriptionState::Expired => "expired",
    }
}

pub fn subscriptions(
    out: &mut impl Write,
    statuses: &[SubscriptionStatus<'_>],
    warning: Option<&UserSubscription>,
) -> io::Result<()> {
    if let Some(sub) = warning {
        writeln!(
            out,
            "Your {} ends on {}. Renew it to keep your benefits.\n",
            sub.subscription.display_name(),
            sub.end_date
        )?;
    }

    if statuses.is_empty() {
        writeln!(out, "You have no subscriptions.")?;
        return Ok(());
    }

    writeln!(
        out,
        "{:<6} {:<20} {:<12} {:<12} {:<14} {}",
        "ID", "Plan", "Start", "End", "State", "Renewal"
    )?;
    writeln!(out, "{}", "-".repeat(90))?;
    for status in statuses {
        let sub = status.subscription;
        let renewal = if status.renewal.is_allowed() {
            "available"
        } else {
            status.renewal.reason()
        };
        writeln!(
            out,
            "{:<6} {:<20} {:<12} {:<12} {:<14} {}",
            sub.id,
            truncate_string(&sub.subscription.display_name(), 20),
            sub.start_date,
            sub.end_date,
            state_label(status.state),
            renewal
        )?;
    }
    Ok(())
}

pub fn quote(out: &mut impl Write, cart: &Cart, quote: &PriceQuote) -> io::Result<()> {
    writeln!(out, "{:<8} {:<28} {:>5} {:>10}", "ID", "Item", "Qty", "Unit")?;
    writeln!(out, "{}", "-".repeat(54))?;
    for item in cart.items() {
        writeln!(
            out,
            "{:<8} {:<28} {:>5} {:>10.2}",
            item.product_id,
            truncate_string(&item.name, 28),
            item.quantity,
            item.unit_price
        )?;
    }
    writeln!(out, "{}", "-".repeat(54))?;
    writeln!(out, "{:<43} {:>10.2}", "Products", quote.products_price)?;
    writeln!(out, "{:<43} {:>10.2}", "Transport", quote.transport_price)?;
    writeln!(out, "{:<43} {:>10.2}", "Total", quote.total_price)
}
