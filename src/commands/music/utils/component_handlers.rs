use poise::serenity_prelude::{self as serenity, Context};
use serenity::{
    ComponentInteraction, CreateInteractionResponse, CreateInteractionResponseMessage,
};
use tracing::{error, info};

use crate::Data;

use super::button_controls::Control;
use super::music_manager::{MusicError, MusicManager};

type ButtonInteractionResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Handle a press on one of the player buttons.
///
/// The action applies to the guild the button was pressed in, and the outcome
/// is answered ephemerally to the presser only.
pub async fn handle_interaction(
    ctx: &Context,
    interaction: &ComponentInteraction,
    data: &Data,
) -> ButtonInteractionResult {
    let Some(control) = Control::from_custom_id(&interaction.data.custom_id) else {
        error!("Unknown button ID: {}", interaction.data.custom_id);
        return respond(ctx, interaction, "Unknown button action.").await;
    };

    let Some(guild_id) = interaction.guild_id else {
        return respond(ctx, interaction, &MusicError::NotInGuild.to_string()).await;
    };

    info!(
        "User {} pressed {:?} in guild {}",
        interaction.user.id, control, guild_id
    );

    let content = match MusicManager::apply_control(data, guild_id, control).await {
        Ok(confirmation) => confirmation.to_string(),
        Err(e) => e.to_string(),
    };

    respond(ctx, interaction, &content).await
}

/// Send an ephemeral reply to the interaction
async fn respond(
    ctx: &Context,
    interaction: &ComponentInteraction,
    content: &str,
) -> ButtonInteractionResult {
    interaction
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .content(content)
                    .ephemeral(true),
            ),
        )
        .await?;
    Ok(())
}
