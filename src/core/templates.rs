use minijinja::{Environment, Error, Template};
use once_cell::sync::Lazy;
use serde::Serialize;
use strum::{EnumIter, IntoEnumIterator};
use tracing::{error, info};

static TEMPLATES_ENVIRONMENT: Lazy<Environment> = Lazy::new(|| {
    info!("Initializing templating engine environment.");
    let mut env = Environment::new();

    // Use strum to iterate over the variants of the enum.
    for template in MessageTemplate::iter() {
        if let Err(e) = env.add_template(template.name(), template.template()) {
            error!("Could not load template {}. {e}", template.name());
        }
    }

    info!("Templates loaded in templating engine environment.");
    env
});

#[derive(Debug, Clone, Copy, EnumIter)]
pub enum MessageTemplate {
    Help,
    Standings,
    StandingsUnavailable,
    RosterRatings,
    ContestListing,
    RosterRatingsUpdated,
    ContestListingUpdated,
}

impl MessageTemplate {
    pub fn name(&self) -> &'static str {
        match self {
            MessageTemplate::Help => "help.txt",
            MessageTemplate::Standings => "standings.txt",
            MessageTemplate::StandingsUnavailable => "standings_unavailable.txt",
            MessageTemplate::RosterRatings => "ratings.txt",
            MessageTemplate::ContestListing => "contests.txt",
            MessageTemplate::RosterRatingsUpdated => "ratings_updated.txt",
            MessageTemplate::ContestListingUpdated => "contests_updated.txt",
        }
    }

    pub fn get(&self) -> Result<Template<'_, '_>, Error> {
        TEMPLATES_ENVIRONMENT.get_template(self.name())
    }

    pub fn render<S: Serialize>(&self, ctx: S) -> Result<String, Error> {
        self.get()?.render(ctx)
    }

    pub fn template(&self) -> &'static str {
        // \n\ at each code line end creates a line break at the proper position and discards further spaces in this line of code.
        // \x20 (hex; 32 in decimal) is an ASCII space and an indicator for the first space to be preserved in this line of the string.
        match self {
            MessageTemplate::Help => {
                "🗒️ Available commands:\n\
                 \x20 `!help`: this message\n\
                 \x20 `!standings <type> <number>`: roster standings for a contest, e.g. `!standings abc 300`\n\
                 \x20 `!ratings`: latest ratings of the roster\n\
                 \x20 `!contests`: upcoming and recent contests"
            }
            MessageTemplate::Standings => {
                "🏁 Roster standings for *{{ contest }}*:\n\
                 {%- if standings %}\n```\n{{ standings }}\n```\
                 {%- else %}\nNo roster member took part in this contest.\
                 {%- endif %}"
            }
            MessageTemplate::StandingsUnavailable => {
                "⚠️ Could not fetch standings for *{{ contest }}*: {{ error }}"
            }
            MessageTemplate::RosterRatings => {
                "{%- if timestamp -%}\n\
                    📈 Roster ratings as of {{ timestamp }}:\n```\n{{ ratings }}\n```\
                 {%- else -%}\n\
                    📈 Roster ratings are not available yet.\
                 {%- endif -%}"
            }
            MessageTemplate::ContestListing => {
                "{%- if timestamp -%}\n\
                    📅 Contests as of {{ timestamp }}:\n\
                    Upcoming:\n```\n{{ upcoming if upcoming else 'none' }}\n```\n\
                    Recent:\n```\n{{ recent if recent else 'none' }}\n```\
                 {%- else -%}\n\
                    📅 Contest listing is not available yet.\
                 {%- endif -%}"
            }
            MessageTemplate::RosterRatingsUpdated => {
                "🔁 Roster ratings refreshed ({{ count }} member{{ 's' if count != 1 }})."
            }
            MessageTemplate::ContestListingUpdated => {
                "🔁 Contest listing refreshed ({{ upcoming }} upcoming, {{ recent }} recent)."
            }
        }
    }
}
