//! Storefront demo: browse a seeded collection with facets and presets
//!
//! ```text
//! RUST_LOG=storefront=debug cargo run --example storefront [config.yaml]
//! ```

use anyhow::Result;
use std::sync::Arc;
use storefront::prelude::*;
use tracing_subscriber::EnvFilter;

const TRAITS: &[(&str, &[&str])] = &[
    ("Background", &["Blue", "Red", "Green"]),
    ("Eyes", &["Laser", "Sleepy"]),
    ("Hat", &["Crown", "Cap", "None"]),
];

fn seed(backend: &InMemoryStorefront) -> Result<()> {
    backend.insert_marketplace(Marketplace {
        subdomain: "skellies".to_string(),
        name: "Skellies".to_string(),
        description: "A spooky collection".to_string(),
        logo_url: "https://img.example/logo.png".to_string(),
        banner_url: "https://img.example/banner.png".to_string(),
        owner_address: "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU".into(),
        creators: vec!["CreatorKey1111111111111111111111111111111111".into()],
        auction_house: AuctionHouse {
            address: "AuctionHouse11111111111111111111111111111111".into(),
            treasury_mint: None,
            authority: None,
            seller_fee_basis_points: 200,
        },
    })?;
    backend.insert_storefront(Storefront {
        subdomain: "skellies".to_string(),
        title: "Skellies".to_string(),
        description: "A spooky collection".to_string(),
        logo_url: "https://img.example/logo.png".to_string(),
        banner_url: "https://img.example/banner.png".to_string(),
        favicon_url: "https://img.example/favicon.png".to_string(),
        owner_address: "CreatorKey1111111111111111111111111111111111".into(),
    })?;

    for index in 0..12usize {
        let attributes = TRAITS
            .iter()
            .enumerate()
            .map(|(position, (trait_type, values))| NftAttribute {
                trait_type: trait_type.to_string(),
                value: values[(index + position) % values.len()].to_string(),
            })
            .collect();
        let owner = if index % 3 == 0 { "WalletAlice" } else { "WalletBob" };
        let listings = if index % 2 == 0 {
            vec![Listing {
                address: format!("Listing{}", index).into(),
                auction_house: "AuctionHouse11111111111111111111111111111111".into(),
                price: 1_000_000_000 + index as u64 * 250_000_000,
            }]
        } else {
            vec![]
        };

        backend.insert_nft(NftRecord::new(
            NftDetail {
                address: format!("Skull{:02}", index).into(),
                name: format!("Skellie #{}", index),
                description: "Spooky".to_string(),
                image: format!("https://img.example/skull-{}.png", index),
                mint_address: None,
                seller_fee_basis_points: 500,
                attributes,
                owner: Some(owner.into()),
                listings,
            },
            vec!["CreatorKey1111111111111111111111111111111111".into()],
        ))?;
    }

    Ok(())
}

async fn show(label: &str, sync: &QuerySynchronizer, placeholders: usize) -> Result<()> {
    let mut rx = sync.watch();
    rx.wait_for(|state| !state.is_loading()).await?;

    match sync.view(placeholders) {
        ResultView::Grid { cards } => {
            println!("{} ({} items)", label, cards.len());
            for card in cards {
                let price = card
                    .price
                    .map(|lamports| format!("{} lamports", lamports))
                    .unwrap_or_else(|| "not listed".to_string());
                println!("  {:<12} {:<10} {}", card.name, card.address, price);
            }
        }
        ResultView::Empty { title, message } => println!("{}: {} - {}", label, title, message),
        ResultView::Error { message } => println!("{}: error: {}", label, message),
        ResultView::Loading { placeholders } => {
            println!("{}: loading ({} placeholders)", label, placeholders)
        }
    }
    println!();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => StorefrontConfig::from_yaml_file(&path)?,
        None => StorefrontConfig {
            subdomain: Some("skellies".to_string()),
            ..Default::default()
        },
    }
    .with_env_overrides();

    let backend = Arc::new(InMemoryStorefront::new());
    seed(&backend)?;

    let loader = PageLoader::new(config.clone(), backend.clone(), backend.clone(), backend.clone());
    let creator = Address::new("CreatorKey1111111111111111111111111111111111");
    let page = loader.creator_page(None, &creator).await?;

    println!("== {} ==", page.marketplace.name);
    for group in &page.trait_groups {
        let options: Vec<String> = group.options().into_iter().map(|o| o.label).collect();
        println!("  {}: {}", group.name, options.join(", "));
    }
    println!();

    let bus = EventBus::new(config.event_capacity);
    let mut events = bus.subscribe();
    tokio::spawn(async move {
        while let Ok(envelope) = events.recv().await {
            tracing::info!(
                action = envelope.event.action(),
                sequence = envelope.event.sequence(),
                "query event"
            );
        }
    });

    let store = page.filter_store();
    let mut sync = QuerySynchronizer::builder(backend.clone(), page.query_context(None))
        .with_event_bus(bus)
        .mount(&store)?;
    show("All", &sync, config.placeholder_count).await?;

    store.set_group_selection("Eyes", vec![FacetOption::new("Laser", "Laser")]);
    show("Eyes = Laser", &sync, config.placeholder_count).await?;

    store.set_preset(PresetFilter::Listed);
    show("Listed, Eyes = Laser", &sync, config.placeholder_count).await?;

    store.set_preset(PresetFilter::Owned);
    show("Owned (no wallet)", &sync, config.placeholder_count).await?;

    sync.set_wallet(Some("WalletAlice".into()));
    show("Owned by WalletAlice, Eyes = Laser", &sync, config.placeholder_count).await?;

    let detail = loader_detail(&loader, &sync).await?;
    println!("{}", detail);

    sync.unmount();
    Ok(())
}

async fn loader_detail(loader: &PageLoader, sync: &QuerySynchronizer) -> Result<String> {
    let Some(first) = sync.state().items.first().cloned() else {
        return Ok("no NFT to open".to_string());
    };

    let context = sync.context();
    match loader.nft_page(None, &first.address).await {
        Ok(page) => {
            let actions = page.actions(context.wallet.as_ref(), context.auction_house.as_ref());
            let labels: Vec<&str> = actions.actions.iter().map(DetailAction::label).collect();
            Ok(format!("{}: {}", page.nft.name, labels.join(" | ")))
        }
        Err(err) if err.is_not_found() => Ok(format!("{}: {}", first.address, err)),
        Err(err) => Err(err.into()),
    }
}
