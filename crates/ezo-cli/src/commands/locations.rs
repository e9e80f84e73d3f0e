use ezo_client::{EzoClient, LocationFilter, LocationUpdate, NewLocation};

use crate::cli::GlobalFlags;
use crate::cli::subcommands::LocationCommands;
use crate::commands::{emit_listing, read_payload};
use crate::output::output;

/// Handle `ezo locations`.
pub async fn handle(
    action: &LocationCommands,
    client: &EzoClient,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        LocationCommands::List { status } => {
            let filter = status.map(LocationFilter::new);
            emit_listing(client.get_locations(filter.as_ref()).await, flags)
        }
        LocationCommands::Show { id } => {
            output(&client.get_location_details(*id).await?, flags.format)
        }
        LocationCommands::Quantities { id } => output(
            &client.get_location_item_quantities(*id).await?,
            flags.format,
        ),
        LocationCommands::Create { file } => {
            let location: NewLocation = read_payload(file)?;
            output(&client.create_location(&location).await?, flags.format)
        }
        LocationCommands::Update { id, file } => {
            let update: LocationUpdate = read_payload(file)?;
            output(&client.update_location(*id, &update).await?, flags.format)
        }
        LocationCommands::Activate { id } => {
            output(&client.activate_location(*id).await?, flags.format)
        }
        LocationCommands::Deactivate { id } => {
            output(&client.deactivate_location(*id).await?, flags.format)
        }
    }
}
