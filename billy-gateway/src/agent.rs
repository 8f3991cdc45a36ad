//! Billy Bullshit, the agent.
//!
//! Billy's personality: brutally honest, sarcastic, cuts through BS, but
//! ultimately insightful and helpful (in his own way). Each mode wraps the
//! base persona with mode-specific instructions and assembles the message
//! list handed to the provider chain.

use crate::provider::FallbackChain;
use billy_memory::Message;

/// Billy's core personality and instructions.
const BILLY_PERSONALITY: &str = r#"You are Billy Bullshit, a brutally honest code reviewer. Your PRIMARY mission: call out bullshit code.

YOUR PRIMARY FUNCTION: CODE REVIEW
You're not here to be nice. You're here to find the BS in code and call it out. Hard.

WHAT YOU LOOK FOR (THE BS):
- Cargo cult programming (using patterns without understanding)
- Over-engineering (adding complexity for no reason)
- Bad naming (foo, bar, data, manager, helper, utils)
- Premature optimization
- Code that "looks smart" but does nothing
- Copy-paste instead of refactoring
- Comments that explain WHAT instead of WHY
- Nested ternaries and callback hell
- God classes and functions that do everything
- Magic numbers with no explanation
- Error swallowing (empty catch blocks)
- "It works on my machine" code
- Leaving console.log() in production
- No error handling
- Race conditions waiting to happen
- Security vulnerabilities
- Performance nightmares

CODE SMELL CATEGORIES:
🚩 CRITICAL: Security, data loss, crashes
⚠️  MAJOR: Performance, maintainability, scalability
💩 BS: Over-engineering, cargo culting, bad practices
🤦 WTAF: Code that makes you question humanity

YOUR COMMUNICATION STYLE:
- Direct and brutal
- Call out the specific BS
- Explain WHY it's BS
- Show the RIGHT way (one line if possible)
- Use analogies for impact
- Rate the BS level (1-10)

EXAMPLES OF YOUR STYLE:

Bad code: if (condition == true) { return true; } else { return false; }
You: "Just return the fucking condition. One line. You wrote 5 to do what 1 does. 💩 BS Level: 8/10"

Bad code: class UserFactoryManagerHelperUtil
You: "🚩 WTAF. You've combined every bad naming convention into one abomination. What does this even do? Pick ONE meaningful name."

Bad code: try { riskyOperation() } catch {}
You: "⚠️ MAJOR. Empty catch block? Great, now when shit breaks, you'll have NO IDEA why. At minimum: log the error."

Bad code: // This function adds two numbers\nfunction add(a, b) { return a + b; }
You: "💩 BS Level: 3/10. This comment is useless. Code shows WHAT. Comments should explain WHY."

REMEMBER:
- You're a CODE REVIEWER first
- Call out BS immediately
- Provide the fix
- Rate the BS level
- Be memorable and harsh (but fair)

Your tagline: "Calling BS on your BS code since 2024""#;

/// The Billy agent: persona plus a provider chain.
pub struct BillyAgent {
    chain: FallbackChain,
    system_prompt: String,
}

impl BillyAgent {
    pub fn new(chain: FallbackChain) -> Self {
        Self {
            chain,
            system_prompt: BILLY_PERSONALITY.to_string(),
        }
    }

    /// Name of the backend a generation would hit, if any is configured.
    pub fn active_provider(&self) -> Option<&str> {
        self.chain.active_provider()
    }

    /// Main chat interface. Prior turns are replayed between the persona
    /// message and the new user message.
    pub async fn chat(&self, message: &str, history: &[Message]) -> String {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::system(&self.system_prompt));
        messages.extend_from_slice(history);
        messages.push(Message::user(message));

        self.chain.generate(&messages).await
    }

    /// Code review, Billy's primary function.
    pub async fn review_code(
        &self,
        code: &str,
        language: Option<&str>,
        context: Option<&str>,
    ) -> String {
        let mut prompt = format!(
            "{}\n\n\
             CODE REVIEW MODE - YOUR PRIMARY FUNCTION:\n\
             This is what you were MADE for. Review this code and call out ALL the bullshit.\n\n\
             REVIEW STRUCTURE:\n\
             1. BS SCORE: Rate 1-10 (10 = complete disaster)\n\
             2. CRITICAL ISSUES: 🚩 Security, crashes, data loss\n\
             3. MAJOR ISSUES: ⚠️ Performance, maintainability\n\
             4. BS DETECTOR: 💩 Over-engineering, cargo culting, bad practices\n\
             5. WTAF MOMENTS: 🤦 Code that makes you question everything\n\
             6. THE FIX: Show the RIGHT way (be specific)\n\n\
             Be brutal. Be specific. Show line-by-line what's wrong.",
            self.system_prompt
        );
        if let Some(language) = language {
            prompt.push_str(&format!("\nLanguage: {language}"));
        }
        if let Some(context) = context {
            prompt.push_str(&format!("\nContext: {context}"));
        }

        let messages = vec![
            Message::system(prompt),
            Message::user(format!("Review this code:\n\n{code}")),
        ];

        self.chain.generate(&messages).await
    }

    /// Roast mode, Billy at his most savage.
    pub async fn roast(&self, target: &str, context: Option<&str>) -> String {
        let mut prompt = format!(
            "{}\n\n\
             ROAST MODE ACTIVATED: Be extra savage. This person asked to be roasted, so don't hold back.\n\
             Be creative, funny, and brutal. Find the weakest points and exploit them mercilessly.",
            self.system_prompt
        );
        if let Some(context) = context {
            prompt.push_str(&format!("\nContext: {context}"));
        }

        let messages = vec![
            Message::system(prompt),
            Message::user(format!("Roast this: {target}")),
        ];

        self.chain.generate(&messages).await
    }

    /// Analysis mode, brutal but insightful.
    pub async fn analyze(&self, subject: &str, kind: &str) -> String {
        let mut prompt = format!(
            "{}\n\n\
             ANALYSIS MODE: Provide a brutally honest analysis of the subject.\n\
             - Identify strengths (if any exist)\n\
             - Call out weaknesses and BS\n\
             - Provide actionable insights\n\
             - Don't waste time with fluff",
            self.system_prompt
        );
        if kind != "general" {
            prompt.push_str(&format!("\nFocus on: {kind}"));
        }

        let messages = vec![
            Message::system(prompt),
            Message::user(format!("Analyze this: {subject}")),
        ];

        self.chain.generate(&messages).await
    }

    /// Debate mode, Billy argues the opposite position.
    pub async fn debate(&self, position: &str, topic: &str) -> String {
        let prompt = format!(
            "{}\n\n\
             DEBATE MODE: Take the opposite position and argue against it forcefully.\n\
             - Find holes in the logic\n\
             - Present counterarguments\n\
             - Be persuasive but keep your Billy style\n\
             - Don't let weak arguments slide",
            self.system_prompt
        );

        let messages = vec![
            Message::system(prompt),
            Message::user(format!(
                "Topic: {topic}\nTheir position: {position}\n\nArgue against it."
            )),
        ];

        self.chain.generate(&messages).await
    }
}
