//! Interactive flow for the provision command.
//!
//! Asks for each provisioning choice with dialoguer prompts, starting from
//! the device's suggested defaults.

use std::io::{self, Write};

use anyhow::Result;
use console::style;
use dialoguer::{Confirm, Select, theme::ColorfulTheme};

use deckhand_core::commands::ProvisionPlan;
use deckhand_core::debloat::Tier;

/// Pre-filled answers that skip the matching prompt.
#[derive(Debug, Clone, Default)]
pub struct PrefilledOptions {
    /// Debloat tier - if Some, skip tier prompt
    pub tier: Option<Tier>,
    /// Remove privacy services - if Some, skip degoogle prompt
    pub degoogle: Option<bool>,
    /// App set - if Some, skip set selection (`Some(None)` means no apps)
    pub app_set: Option<Option<String>>,
    /// Apply the suggested settings profile - if Some, skip settings prompt
    pub apply_settings: Option<bool>,
    /// Skip the final confirmation
    pub yes: bool,
}

/// Result of interactive flow.
#[derive(Debug, Clone)]
pub struct InteractiveResult {
    pub plan: ProvisionPlan,
    /// Whether the user confirmed the run
    pub confirmed: bool,
}

/// Interactive flow for collecting provision choices.
pub struct InteractiveFlow<W: Write = io::Stdout> {
    /// Suggested choices for the connected device
    defaults: ProvisionPlan,
    /// App sets available on disk
    app_sets: Vec<String>,
    prefilled: PrefilledOptions,
    /// Output writer (for testing)
    writer: W,
    theme: ColorfulTheme,
}

impl InteractiveFlow<io::Stdout> {
    pub fn new(defaults: ProvisionPlan, app_sets: Vec<String>, prefilled: PrefilledOptions) -> Self {
        Self {
            defaults,
            app_sets,
            prefilled,
            writer: io::stdout(),
            theme: ColorfulTheme::default(),
        }
    }
}

impl<W: Write> InteractiveFlow<W> {
    #[cfg(test)]
    pub fn with_writer(
        defaults: ProvisionPlan,
        app_sets: Vec<String>,
        prefilled: PrefilledOptions,
        writer: W,
    ) -> Self {
        Self {
            defaults,
            app_sets,
            prefilled,
            writer,
            theme: ColorfulTheme::default(),
        }
    }

    /// Run the prompts.
    ///
    /// Flow:
    /// 1. Debloat tier (default: suggested)
    /// 2. Remove privacy services
    /// 3. App set, or none
    /// 4. Apply the suggested settings profile, when there is one
    /// 5. Show summary and confirm
    pub fn collect(&mut self) -> Result<InteractiveResult> {
        self.print_header()?;

        let tier = self.prompt_tier()?;
        let degoogle = self.prompt_degoogle()?;
        let app_set = self.prompt_app_set()?;
        let settings = self.prompt_settings()?;

        let plan = ProvisionPlan {
            tier,
            degoogle,
            app_set,
            settings,
        };
        let confirmed = self.show_summary_and_confirm(&plan)?;

        Ok(InteractiveResult { plan, confirmed })
    }

    fn print_header(&mut self) -> Result<()> {
        writeln!(self.writer)?;
        writeln!(
            self.writer,
            "{}",
            style("  Deckhand Provisioning").bold().cyan()
        )?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn prompt_tier(&self) -> Result<Tier> {
        if let Some(tier) = self.prefilled.tier {
            return Ok(tier);
        }

        let items = vec![
            "light      - carrier and vendor extras only",
            "standard   - plus vendor apps with open replacements",
            "aggressive - everything not needed to boot",
        ];
        let default = Tier::ALL
            .iter()
            .position(|t| *t == self.defaults.tier)
            .unwrap_or(0);

        let selection = Select::with_theme(&self.theme)
            .with_prompt("Debloat level")
            .items(&items)
            .default(default)
            .interact()?;

        Ok(Tier::ALL.get(selection).copied().unwrap_or(self.defaults.tier))
    }

    fn prompt_degoogle(&self) -> Result<bool> {
        if let Some(degoogle) = self.prefilled.degoogle {
            return Ok(degoogle);
        }

        let answer = Confirm::with_theme(&self.theme)
            .with_prompt("Also remove Google services?")
            .default(self.defaults.degoogle)
            .interact()?;
        Ok(answer)
    }

    fn prompt_app_set(&self) -> Result<Option<String>> {
        if let Some(choice) = &self.prefilled.app_set {
            return Ok(choice.clone());
        }
        if self.app_sets.is_empty() {
            return Ok(None);
        }

        let mut items = vec!["(none)".to_string()];
        items.extend(self.app_sets.iter().cloned());
        let default = self
            .defaults
            .app_set
            .as_ref()
            .and_then(|set| self.app_sets.iter().position(|s| s == set))
            .map(|i| i + 1)
            .unwrap_or(0);

        let selection = Select::with_theme(&self.theme)
            .with_prompt("App set to install")
            .items(&items)
            .default(default)
            .interact()?;

        Ok(selection
            .checked_sub(1)
            .and_then(|i| self.app_sets.get(i))
            .cloned())
    }

    fn prompt_settings(&self) -> Result<Option<String>> {
        let Some(profile) = &self.defaults.settings else {
            return Ok(None);
        };

        let apply = match self.prefilled.apply_settings {
            Some(apply) => apply,
            None => Confirm::with_theme(&self.theme)
                .with_prompt(format!("Apply settings profile '{profile}'?"))
                .default(true)
                .interact()?,
        };
        Ok(apply.then(|| profile.clone()))
    }

    fn show_summary_and_confirm(&mut self, plan: &ProvisionPlan) -> Result<bool> {
        writeln!(self.writer)?;
        writeln!(self.writer, "{}", style("  Summary").bold())?;
        writeln!(self.writer, "  ───────────────────────────")?;
        writeln!(self.writer, "  Debloat:  {}", style(plan.tier).green())?;
        writeln!(
            self.writer,
            "  Degoogle: {}",
            style(if plan.degoogle { "yes" } else { "no" }).green()
        )?;
        writeln!(
            self.writer,
            "  Apps:     {}",
            style(plan.app_set.as_deref().unwrap_or("none")).green()
        )?;
        writeln!(
            self.writer,
            "  Settings: {}",
            style(plan.settings.as_deref().unwrap_or("none")).green()
        )?;
        writeln!(self.writer)?;

        if self.prefilled.yes {
            return Ok(true);
        }

        let confirmed = Confirm::with_theme(&self.theme)
            .with_prompt("Proceed with provisioning?")
            .default(true)
            .interact()?;

        Ok(confirmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> ProvisionPlan {
        ProvisionPlan {
            tier: Tier::Standard,
            degoogle: false,
            app_set: Some("default".to_string()),
            settings: Some("pixel-8".to_string()),
        }
    }

    fn sets() -> Vec<String> {
        vec!["default".to_string(), "minimal".to_string()]
    }

    #[test]
    fn test_prefilled_options_default() {
        let prefilled = PrefilledOptions::default();

        assert!(prefilled.tier.is_none());
        assert!(prefilled.degoogle.is_none());
        assert!(prefilled.app_set.is_none());
        assert!(prefilled.apply_settings.is_none());
        assert!(!prefilled.yes);
    }

    #[test]
    fn test_prefilled_skips_prompts() {
        let prefilled = PrefilledOptions {
            tier: Some(Tier::Aggressive),
            degoogle: Some(true),
            app_set: Some(Some("minimal".to_string())),
            apply_settings: Some(true),
            yes: true,
        };

        let mut output = Vec::new();
        let mut flow = InteractiveFlow::with_writer(defaults(), sets(), prefilled, &mut output);
        let result = flow.collect().unwrap();

        assert!(result.confirmed);
        assert_eq!(
            result.plan,
            ProvisionPlan {
                tier: Tier::Aggressive,
                degoogle: true,
                app_set: Some("minimal".to_string()),
                settings: Some("pixel-8".to_string()),
            }
        );
    }

    #[test]
    fn test_declining_settings_drops_profile() {
        let prefilled = PrefilledOptions {
            tier: Some(Tier::Light),
            degoogle: Some(false),
            app_set: Some(None),
            apply_settings: Some(false),
            yes: true,
        };

        let mut output = Vec::new();
        let mut flow = InteractiveFlow::with_writer(defaults(), sets(), prefilled, &mut output);
        let result = flow.collect().unwrap();

        assert_eq!(result.plan.app_set, None);
        assert_eq!(result.plan.settings, None);
    }

    #[test]
    fn test_no_suggested_settings_skips_prompt() {
        let mut plan = defaults();
        plan.settings = None;
        let prefilled = PrefilledOptions {
            tier: Some(Tier::Light),
            degoogle: Some(false),
            app_set: Some(None),
            yes: true,
            ..Default::default()
        };

        let mut output = Vec::new();
        let mut flow = InteractiveFlow::with_writer(plan, vec![], prefilled, &mut output);
        let result = flow.collect().unwrap();

        assert!(result.plan.settings.is_none());
    }

    #[test]
    fn test_summary_output_format() {
        let prefilled = PrefilledOptions {
            tier: Some(Tier::Standard),
            degoogle: Some(true),
            app_set: Some(Some("default".to_string())),
            apply_settings: Some(true),
            yes: true,
        };

        let mut output = Vec::new();
        let mut flow = InteractiveFlow::with_writer(defaults(), sets(), prefilled, &mut output);
        flow.collect().unwrap();

        let output_str = String::from_utf8(output).unwrap();
        assert!(output_str.contains("Summary"));
        assert!(output_str.contains("standard"));
        assert!(output_str.contains("default"));
        assert!(output_str.contains("pixel-8"));
    }
}
