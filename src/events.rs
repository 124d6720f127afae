use poise::serenity_prelude as serenity;
use serenity::all::{FullEvent, Interaction};
use tracing::{error, info};

use crate::commands::music::utils::{button_controls::CONTROL_PREFIX, component_handlers};
use crate::{Data, Error};

/// Gateway events that are not commands
pub async fn event_handler(
    ctx: &serenity::Context,
    event: &FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        FullEvent::Ready { data_about_bot } => {
            info!(
                "Logged in as {} (ID: {})",
                data_about_bot.user.name, data_about_bot.user.id
            );
        }
        FullEvent::InteractionCreate {
            interaction: Interaction::Component(component),
        } if component.data.custom_id.starts_with(CONTROL_PREFIX) => {
            // Handle component interactions for components with identities starting with "music_"
            if let Err(e) = component_handlers::handle_interaction(ctx, component, data).await {
                error!("Error handling component interaction: {}", e);
            }
        }
        _ => (),
    }

    Ok(())
}
