//! General Discord commands - ping and help.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "**RentBuddy Help**\n\
        Here is a summary of all available commands for RentBuddy.\n\n\
        **Billing Commands**\n\
        • `/generate_rents [dry_run]` - Bills every living student for this month.\n\
        • `/pay_rent <phone> [rent] [advance] [external] [previous_due] [period] [channel] [details]` - Records a payment.\n\
        • `/full_pay <phone> [period] [channel] [details]` - Settles everything owed on a rent.\n\
        • `/rents [period]` - Shows a period's rents and collection progress.\n\
        • `/rent_history [phone] [period] [page]` - Shows the payment ledger.\n\n\
        **Student Commands**\n\
        • `/add_student <phone> <name> <category> [sms_phone] [joining_date] [referred_by]` - Admits a student.\n\
        • `/student_leave <phone>` - Marks a student as departed.\n\
        • `/student_return <phone> [joining_date]` - Re-admits a departed student.\n\
        • `/move_student <phone> <category>` - Changes a student's room category.\n\
        • `/students [departed]` - Lists students.\n\n\
        **Category Commands**\n\
        • `/add_category <title> <amount> [description]` - Adds a room category.\n\
        • `/set_category_amount <title> <amount>` - Changes a tariff.\n\
        • `/set_category_active <title> <active>` - Activates or retires a category.\n\
        • `/categories` - Lists categories.\n\n\
        **Utility Commands**\n\
        • `/ping` - Checks if the bot is responsive.\n\
        • `/help` - Shows this help message.";

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
