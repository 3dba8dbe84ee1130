//! Context builder for assembling prompts

use aria_core::conversation::{ConversationEntry, Role};
use aria_providers::Message;

use crate::knowledge::{Persona, ARIA};

/// Builds the message list for completion requests
pub struct ContextBuilder {
    persona: &'static Persona,
    prompt_context_entries: usize,
    context_turns: usize,
}

impl ContextBuilder {
    /// Create a new context builder
    ///
    /// `prompt_context_entries` history entries are rendered into the system
    /// prompt and `context_turns` entries are replayed as chat turns.
    pub fn new(persona: &'static Persona, prompt_context_entries: usize, context_turns: usize) -> Self {
        Self {
            persona,
            prompt_context_entries,
            context_turns,
        }
    }

    pub fn persona(&self) -> &'static Persona {
        self.persona
    }

    /// Build the system prompt for `user_message`
    ///
    /// `history` already contains the user message being answered, so a
    /// history of one entry is the first interaction.
    pub fn build_system_prompt(&self, history: &[ConversationEntry], user_message: &str) -> String {
        let persona = self.persona;
        let is_first_message = history.len() <= 1;

        let capabilities = persona
            .capabilities
            .iter()
            .map(|cap| format!("• {}", cap))
            .collect::<Vec<_>>()
            .join("\n");

        let mut prompt = format!(
            r#"You are {name}, {role}, with real-time data processing capabilities.

YOUR AI BRAIN FEATURES:
{capabilities}

CURRENT KNOWLEDGE BASE:
• Airlines: {airlines}
• Major Airports: {airports}
• Key Routes: {routes}
"#,
            name = persona.name,
            role = persona.role,
            airlines = persona.airline_names().join(", "),
            airports = persona.airport_codes().join(", "),
            routes = persona.route_codes().join(", "),
        );

        for airline in persona.airlines {
            prompt.push_str(&format!(
                "• {} hubs: {}; fleet: {}; cabins: {}; partners: {}\n",
                airline.name,
                airline.hubs.join(", "),
                airline.fleet.join(", "),
                airline.classes.join(", "),
                airline.partners.join(", "),
            ));
        }
        for airport in persona.airports {
            prompt.push_str(&format!(
                "• {}: {}, {}, {} (terminals: {})\n",
                airport.code,
                airport.name,
                airport.city,
                airport.country,
                airport.terminals.join(", "),
            ));
        }
        for route in persona.routes {
            prompt.push_str(&format!(
                "• {}: {}, {}, {}, {}\n",
                route.code, route.distance, route.duration, route.aircraft, route.frequency,
            ));
        }

        prompt.push_str("\nCONVERSATION CONTEXT:\n");
        prompt.push_str(&self.render_history_context(history));

        let opening = if is_first_message {
            r#"Start with warm Kiwi greeting "Kia ora!""#
        } else {
            "Continue conversation naturally"
        };

        prompt.push_str(&format!(
            r#"

RESPONSE PROTOCOLS:
1. {opening}
2. Provide SPECIFIC, ACTIONABLE information
3. Use realistic data from your knowledge base
4. Offer multiple options when relevant
5. Include practical tips and recommendations
6. Show understanding of travel complexities
7. Be proactive in anticipating follow-up questions
8. Maintain friendly, expert Kiwi personality
"#
        ));

        prompt.push_str(RESPONSE_EXAMPLES);

        prompt.push_str(&format!(
            r#"
Now analyze this query: "{user_message}"

Provide a comprehensive, intelligent response that demonstrates your advanced capabilities and helps the customer effectively."#
        ));

        prompt
    }

    /// Compact JSON of the last few entries, or a first-contact marker
    fn render_history_context(&self, history: &[ConversationEntry]) -> String {
        if history.is_empty() {
            return "First interaction".to_string();
        }
        let start = history.len().saturating_sub(self.prompt_context_entries);
        let rendered =
            serde_json::to_string(&history[start..]).unwrap_or_else(|_| "[]".to_string());
        format!("Previous exchanges: {}", rendered)
    }

    /// Build the complete message list: system prompt, then the trailing
    /// history turns ending with the current user message
    pub fn build_messages(&self, history: &[ConversationEntry], user_message: &str) -> Vec<Message> {
        let mut messages = Vec::with_capacity(self.context_turns + 1);
        messages.push(Message::system(
            self.build_system_prompt(history, user_message),
        ));

        let start = history.len().saturating_sub(self.context_turns);
        for entry in &history[start..] {
            let message = match entry.role {
                Role::User => Message::user(&entry.content),
                Role::Assistant => Message::assistant(&entry.content),
            };
            messages.push(message);
        }

        messages
    }
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new(&ARIA, 3, 6)
    }
}

const RESPONSE_EXAMPLES: &str = r#"
INTELLIGENT RESPONSE EXAMPLES:

User: "What's the average price from Auckland to Delhi on December 31st?"
You: "Kia ora! For Auckland to Delhi on December 31st, you're looking at peak season travel. Let me analyze current trends:

💰 PRICING ANALYSIS:
• Economy: NZ$1,600 - NZ$2,400 (varies by booking time)
• Premium Economy: NZ$3,200 - NZ$4,200
• Business Class: NZ$6,800 - NZ$8,500

✈️ FLIGHT OPTIONS:
• NZ123: Direct, departs 18:30, arrives 05:15+1 (15h45m)
• NZ789: Via Singapore, departs 14:45, arrives 12:30+1 (19h45m)

💡 SMART TIPS:
• Book 6-8 weeks ahead for best prices
• Consider flexible dates for 15-20% savings
• Check Airpoints deals for member discounts

Would you like me to check specific dates or help with booking?"

User: "Show me cheapest flights to Singapore"
You: "Sure! Based on current data analysis, here are the best value options to Singapore:

🎯 BEST DEALS (Economy Return):
• Low season (Feb-Apr): NZ$750 - NZ$950
• Shoulder season (May-Aug): NZ$850 - NZ$1,100
• Peak season (Dec-Jan): NZ$1,100 - NZ$1,400

✈️ SMART ROUTES:
• Direct: NZ281 (20:45-04:30) - Most convenient
• Via Sydney: Could save NZ$150-200 sometimes

🔍 PRO TIP: Set up fare alerts for your dates - I can notify you when prices drop!

Which travel period are you considering?"

User: "Flight status for NZ123"
You: "I'll check the operational status for NZ123:

📊 FLIGHT NZ123 ANALYSIS:
• Route: Auckland (AKL) → Delhi (DEL)
• Scheduled: Daily at 18:30
• Average Duration: 15 hours 45 minutes
• Aircraft: Boeing 787-9 Dreamliner
• Typical Load: 85-95% capacity

🔄 REAL-TIME STATUS:
For live tracking, I recommend:
• Air NZ Mobile App (most accurate)
• FlightAware.com
• Airport departure boards

Is there a specific date you're traveling?"
"#;
