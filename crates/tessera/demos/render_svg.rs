//! Lays out a small checkout flow and writes it as SVG.
//!
//! ```sh
//! cargo run --example render_svg -- checkout.svg
//! ```

use std::{env, error::Error, fs};

use log::info;

use tessera::{
    SequenceLayout,
    config::LayoutConfig,
    event::{ArrowStyle, Diagram, NotePlacement, NoteSide, SequenceEvent},
    identifier::Id,
    text::FontMeasure,
};

fn checkout() -> Diagram {
    let user = Id::new("user");
    let shop = Id::new("shop");
    let payments = Id::new("payments");

    Diagram::new()
        .with_participant("user", "Customer")
        .with_participant("shop", "Web Shop")
        .with_participant("payments", "Payment Gateway")
        .with_event(SequenceEvent::message(user, shop, Some("checkout(cart)")))
        .with_event(SequenceEvent::Activate(shop))
        .with_event(SequenceEvent::message(shop, shop, Some("reserve stock")))
        .with_event(SequenceEvent::FragmentStart {
            operator: "alt".to_string(),
            guard: Some("card on file".to_string()),
        })
        .with_event(
            SequenceEvent::message(shop, payments, Some("charge(amount)"))
                .with_note(NoteSide::Right, "idempotency key\nattached"),
        )
        .with_event(SequenceEvent::Activate(payments))
        .with_event(
            SequenceEvent::message(payments, shop, Some("receipt")).with_style(ArrowStyle::Return),
        )
        .with_event(SequenceEvent::Deactivate(payments))
        .with_event(SequenceEvent::FragmentElse {
            guard: Some("no card".to_string()),
        })
        .with_event(
            SequenceEvent::message(shop, user, Some("ask for card")).with_style(ArrowStyle::Async),
        )
        .with_event(SequenceEvent::FragmentEnd)
        .with_event(SequenceEvent::Divider(Some("fulfilment".to_string())))
        .with_event(SequenceEvent::note(
            NotePlacement::Across(user, payments),
            "order confirmed, email queued",
        ))
        .with_event(SequenceEvent::Delay(Some("a few days later".to_string())))
        .with_event(SequenceEvent::message(shop, user, Some("parcel shipped")))
        .with_event(SequenceEvent::Deactivate(shop))
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let output = env::args().nth(1).unwrap_or_else(|| "checkout.svg".to_string());
    let layout = SequenceLayout::new(LayoutConfig::default());
    let svg = layout.render_svg(&checkout(), &FontMeasure::new())?;

    fs::write(&output, svg)?;
    info!(output_file = output.as_str(); "SVG exported successfully to");
    Ok(())
}
