use ezo_client::{
    AssetCheckin, AssetCheckout, AssetFilter, AssetUpdate, CheckoutOutcome, EzoClient, NewAsset,
};

use crate::cli::GlobalFlags;
use crate::cli::subcommands::AssetCommands;
use crate::commands::{emit_listing, read_payload};
use crate::output::output;

/// Handle `ezo assets`.
pub async fn handle(
    action: &AssetCommands,
    client: &EzoClient,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        AssetCommands::List { status, params } => {
            let result = match status {
                Some(status) => {
                    let filter = params
                        .iter()
                        .fold(AssetFilter::new(status), |filter, (k, v)| filter.with(k, v));
                    client.get_filtered_assets(&filter).await
                }
                None => client.get_all_assets().await,
            };
            emit_listing(result, flags)
        }
        AssetCommands::Search { term } => emit_listing(client.search_assets(term).await, flags),
        AssetCommands::History { id } => emit_listing(client.get_asset_history(*id).await, flags),
        AssetCommands::Create { file } => {
            let asset: NewAsset = read_payload(file)?;
            output(&client.create_asset(&asset).await?, flags.format)
        }
        AssetCommands::Update { id, file } => {
            let update: AssetUpdate = read_payload(file)?;
            output(&client.update_asset(*id, &update).await?, flags.format)
        }
        AssetCommands::Delete { id } => output(&client.delete_asset(*id).await?, flags.format),
        AssetCommands::Checkin {
            id,
            location,
            comments,
        } => {
            let checkin = AssetCheckin {
                comments: comments.clone(),
                ..AssetCheckin::new(*location)
            };
            output(&client.checkin_asset(*id, &checkin).await?, flags.format)
        }
        AssetCommands::Checkout {
            id,
            user,
            location,
            comments,
            till,
        } => {
            let checkout = AssetCheckout {
                location_id: *location,
                comments: comments.clone(),
                till: till.clone(),
                ..AssetCheckout::default()
            };
            match client.checkout_asset(*id, *user, &checkout).await? {
                CheckoutOutcome::CheckedOut(body) => output(&body, flags.format),
                CheckoutOutcome::Advisory { message, body } => {
                    output(&body, flags.format)?;
                    anyhow::bail!("asset {id} was not checked out: {message}")
                }
            }
        }
    }
}
