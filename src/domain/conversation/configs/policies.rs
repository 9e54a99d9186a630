//! Conversation policies for each agent variant.

use crate::domain::conversation::{
    ConversationPolicy, DialogueError, Gate, PersistEffect, PhaseSpec, Transition,
};
use crate::domain::foundation::AgentVariant;

use super::record_kinds;

/// Returns the validated policy for a variant.
pub fn policy_for_variant(variant: AgentVariant) -> Result<ConversationPolicy, DialogueError> {
    match variant {
        AgentVariant::Starter => starter_policy(),
        AgentVariant::CoffeeOrder => coffee_order_policy(),
        AgentVariant::WellnessCheckIn => wellness_policy(),
        AgentVariant::FitnessLog => fitness_policy(),
        AgentVariant::LeadCapture => lead_capture_policy(),
        AgentVariant::FraudAlert => fraud_alert_policy(),
        AgentVariant::GroceryOrder => grocery_policy(),
        AgentVariant::GameMaster => game_master_policy(),
        AgentVariant::Commerce => commerce_policy(),
        AgentVariant::ImprovBattle => improv_policy(),
    }
}

const ENDED_EARLY: &str = "ended_early";

fn ended_early() -> PhaseSpec {
    PhaseSpec::ended_early(
        ENDED_EARLY,
        "The caller asked to stop. Acknowledge briefly and say goodbye.",
    )
}

fn starter_policy() -> Result<ConversationPolicy, DialogueError> {
    ConversationPolicy::builder(AgentVariant::Starter, "greeting")
        .phase(PhaseSpec::active(
            "greeting",
            "Greet the caller warmly and ask how you can help.",
        ))
        .phase(PhaseSpec::active(
            "conversation",
            "Help with the caller's questions. Keep answers short and spoken-friendly. Call end_conversation once they are done.",
        ))
        .phase(PhaseSpec::terminal("closed", "Thank the caller and say goodbye."))
        .phase(ended_early())
        .transition("greeting", Transition::to("conversation", Gate::Always))
        .transition(
            "conversation",
            Transition::to("closed", Gate::fields_present(&["conversation_finished"])),
        )
        .build()
}

const COFFEE_FIELDS: &[&str] = &["drinkType", "size", "milk", "name"];

fn coffee_order_policy() -> Result<ConversationPolicy, DialogueError> {
    let write_order = || {
        PersistEffect::record(
            record_kinds::COFFEE_ORDER,
            &["drinkType", "size", "milk", "extras", "name"],
        )
    };

    ConversationPolicy::builder(AgentVariant::CoffeeOrder, "greeting")
        .phase(PhaseSpec::active(
            "greeting",
            "Welcome the customer to the cafe and ask what they would like to drink.",
        ))
        .phase(
            PhaseSpec::active(
                "collecting",
                "Ask for one missing detail at a time: drink, size, milk, extras, and the name for the order. Record answers with update_order.",
            )
            .collecting(COFFEE_FIELDS),
        )
        .phase(
            PhaseSpec::active(
                "confirming",
                "Read the order back and ask the customer to confirm. Record the answer with confirm_order.",
            )
            .requiring(COFFEE_FIELDS)
            .collecting(&["confirmed"]),
        )
        .phase(PhaseSpec::terminal(
            "done",
            "Tell the customer their drink is on its way and thank them by name.",
        ))
        .phase(ended_early())
        .transition(
            "greeting",
            Transition::to("confirming", Gate::fields_present(COFFEE_FIELDS)).persisting(write_order()),
        )
        .transition("greeting", Transition::to("collecting", Gate::Always))
        .transition(
            "collecting",
            Transition::to("confirming", Gate::fields_present(COFFEE_FIELDS)).persisting(write_order()),
        )
        .transition("confirming", Transition::to("done", Gate::field_equals("confirmed", true)))
        .transition(
            "confirming",
            Transition::to("collecting", Gate::field_equals("confirmed", false)).clearing(&["confirmed"]),
        )
        .exit_phrases(&["cancel my order"])
        .build()
}

fn wellness_policy() -> Result<ConversationPolicy, DialogueError> {
    ConversationPolicy::builder(AgentVariant::WellnessCheckIn, "greeting")
        .phase(PhaseSpec::active(
            "greeting",
            "Greet the user gently. If a previous check-in is available, mention how they felt last time and their goals.",
        ))
        .phase(
            PhaseSpec::active(
                "check_in",
                "Ask about mood and energy, then about one to three small goals for today. Do not diagnose or give medical advice.",
            )
            .collecting(&["mood", "goals"]),
        )
        .phase(
            PhaseSpec::active(
                "recap",
                "Summarise mood and goals in one or two sentences, offer one simple suggestion, and save the log with save_wellness_log.",
            )
            .requiring(&["mood", "goals"])
            .collecting(&["log_saved"]),
        )
        .phase(PhaseSpec::terminal("done", "Close with encouragement and say goodbye."))
        .phase(ended_early())
        .transition("greeting", Transition::to("check_in", Gate::Always))
        .transition("check_in", Transition::to("recap", Gate::fields_present(&["mood", "goals"])))
        .transition("recap", Transition::to("done", Gate::fields_present(&["log_saved"])))
        .recall(record_kinds::WELLNESS_LOG)
        .build()
}

fn fitness_policy() -> Result<ConversationPolicy, DialogueError> {
    ConversationPolicy::builder(AgentVariant::FitnessLog, "greeting")
        .phase(PhaseSpec::active(
            "greeting",
            "Greet the user. Offer to recall their last workout or log a new one.",
        ))
        .phase(
            PhaseSpec::active(
                "logging",
                "Ask what exercise they did and for how long, then record it with log_workout.",
            )
            .collecting(&["workout_logged"]),
        )
        .phase(PhaseSpec::terminal("done", "Congratulate the user on the workout and say goodbye."))
        .phase(ended_early())
        .transition(
            "greeting",
            Transition::to("done", Gate::fields_present(&["workout_logged"])),
        )
        .transition("greeting", Transition::to("logging", Gate::Always))
        .transition(
            "logging",
            Transition::to("done", Gate::fields_present(&["workout_logged"])),
        )
        .recall(record_kinds::WORKOUT)
        .build()
}

const LEAD_FIELDS: &[&str] = &["name", "contact", "interest"];

fn lead_capture_policy() -> Result<ConversationPolicy, DialogueError> {
    ConversationPolicy::builder(AgentVariant::LeadCapture, "greeting")
        .phase(PhaseSpec::active(
            "greeting",
            "Introduce yourself as the sales representative and ask what brought the visitor here.",
        ))
        .phase(
            PhaseSpec::active(
                "discovery",
                "Answer product questions only from search_faq results. Naturally collect name, contact and interest with update_lead.",
            )
            .collecting(LEAD_FIELDS),
        )
        .phase(
            PhaseSpec::active(
                "wrap_up",
                "Summarise who they are and what they want, then save the lead with save_lead.",
            )
            .requiring(LEAD_FIELDS)
            .collecting(&["lead_saved"]),
        )
        .phase(PhaseSpec::terminal("done", "Thank the visitor and confirm someone will follow up."))
        .phase(ended_early())
        .transition("greeting", Transition::to("discovery", Gate::Always))
        .transition("discovery", Transition::to("wrap_up", Gate::fields_present(LEAD_FIELDS)))
        .transition("wrap_up", Transition::to("done", Gate::fields_present(&["lead_saved"])))
        .exit_phrases(&["not interested", "stop calling"])
        .build()
}

/// Turns allowed in `verify` before the challenge fails.
pub const VERIFY_CHALLENGE_TURNS: u32 = 3;

fn fraud_alert_policy() -> Result<ConversationPolicy, DialogueError> {
    let failed_outcome = || {
        PersistEffect::record(record_kinds::FRAUD_CASE_OUTCOME, &["case_id"])
            .with_value("status", "verification_failed")
            .with_value("note", "Caller did not pass the verification question.")
    };

    ConversationPolicy::builder(AgentVariant::FraudAlert, "greeting")
        .phase(PhaseSpec::active(
            "greeting",
            "Introduce yourself as the bank's fraud monitoring desk and ask for the customer's first name.",
        ))
        .phase(
            PhaseSpec::active(
                "identify",
                "Ask for the customer's first name and load their case with load_case.",
            )
            .collecting(&["case_id"]),
        )
        .phase(
            PhaseSpec::active(
                "verify",
                "Ask the security question from the case and check the answer with verify_answer. Never ask for PINs, passwords or full card numbers.",
            )
            .requiring(&["case_id"])
            .collecting(&["verified"]),
        )
        .phase(
            PhaseSpec::active(
                "review",
                "Read out the suspicious transaction and ask whether the customer made it. Record the outcome with update_case_status.",
            )
            .requiring(&["case_id", "verified"])
            .collecting(&["case_status"]),
        )
        .phase(PhaseSpec::terminal(
            "resolved",
            "Explain what happens next for the confirmed outcome and close the call.",
        ))
        .phase(PhaseSpec::terminal(
            "verification_failed",
            "Explain politely that you could not verify their identity and advise them to call the number on their card.",
        ))
        .phase(ended_early())
        .transition("greeting", Transition::to("verify", Gate::fields_present(&["case_id"])))
        .transition("greeting", Transition::to("identify", Gate::Always))
        .transition("identify", Transition::to("verify", Gate::fields_present(&["case_id"])))
        .transition("verify", Transition::to("review", Gate::field_equals("verified", true)))
        .transition(
            "verify",
            Transition::to("verification_failed", Gate::field_equals("verified", false))
                .persisting(failed_outcome()),
        )
        .transition(
            "verify",
            Transition::to("verification_failed", Gate::TurnsInPhase(VERIFY_CHALLENGE_TURNS))
                .persisting(failed_outcome()),
        )
        .transition("review", Transition::to("resolved", Gate::fields_present(&["case_status"])))
        .build()
}

fn grocery_policy() -> Result<ConversationPolicy, DialogueError> {
    ConversationPolicy::builder(AgentVariant::GroceryOrder, "greeting")
        .phase(PhaseSpec::active(
            "greeting",
            "Welcome the customer to the grocery store and ask what they need today.",
        ))
        .phase(
            PhaseSpec::active(
                "shopping",
                "Add, remove and list cart items with the cart tools. For dishes use add_recipe. When they are done, ask for their name and place the order.",
            )
            .collecting(&["order_placed"]),
        )
        .phase(PhaseSpec::terminal("done", "Read back the order total and say goodbye."))
        .phase(ended_early())
        .transition("greeting", Transition::to("done", Gate::fields_present(&["order_placed"])))
        .transition("greeting", Transition::to("shopping", Gate::Always))
        .transition("shopping", Transition::to("done", Gate::fields_present(&["order_placed"])))
        .build()
}

fn game_master_policy() -> Result<ConversationPolicy, DialogueError> {
    ConversationPolicy::builder(AgentVariant::GameMaster, "opening")
        .phase(PhaseSpec::active(
            "opening",
            "Set the scene of a fantasy adventure in a few vivid sentences and ask the player what they do.",
        ))
        .phase(PhaseSpec::active(
            "adventure",
            "Continue the story from the player's choice, keep it moving, and end each reply by asking what they do next. Record choices with record_decision.",
        ))
        .phase(PhaseSpec::terminal(
            "epilogue",
            "Narrate a short ending that reflects the player's choices.",
        ))
        .phase(ended_early())
        .transition("opening", Transition::to("adventure", Gate::Always))
        .transition(
            "adventure",
            Transition::to("epilogue", Gate::field_equals("story_complete", true)),
        )
        // In-story speech says "goodbye" and "hang up" freely.
        .exit_phrases_only(&["end adventure", "stop game", "quit game", "end the call"])
        .build()
}

fn commerce_policy() -> Result<ConversationPolicy, DialogueError> {
    ConversationPolicy::builder(AgentVariant::Commerce, "browsing")
        .phase(PhaseSpec::active(
            "browsing",
            "Help the shopper find products with list_products. Mention at most three results with name and price.",
        ))
        .phase(
            PhaseSpec::active(
                "ordering",
                "Confirm which product and quantity the shopper wants, then place it with create_order.",
            )
            .requiring(&["shortlist"])
            .collecting(&["last_order_id"]),
        )
        .phase(PhaseSpec::terminal(
            "complete",
            "Read back the order id and total, thank the shopper and say goodbye.",
        ))
        .phase(ended_early())
        .transition("browsing", Transition::to("ordering", Gate::fields_present(&["shortlist"])))
        .transition("ordering", Transition::to("complete", Gate::fields_present(&["last_order_id"])))
        .recall(record_kinds::ORDER)
        .build()
}

const ROUND_DIRECTIVE: &str = "Fetch the scene with get_next_scenario, set it up, let the player perform, react honestly with a mix of praise and critique, then record the round with record_round.";

fn improv_policy() -> Result<ConversationPolicy, DialogueError> {
    ConversationPolicy::builder(AgentVariant::ImprovBattle, "intro")
        .phase(
            PhaseSpec::active(
                "intro",
                "Welcome the player to Improv Battle, explain the three rounds, and ask for their name. Record it with start_game.",
            )
            .collecting(&["player_name"]),
        )
        .phase(PhaseSpec::active("round_1", ROUND_DIRECTIVE))
        .phase(PhaseSpec::active("round_2", ROUND_DIRECTIVE))
        .phase(PhaseSpec::active("round_3", ROUND_DIRECTIVE))
        .phase(PhaseSpec::active(
            "summary",
            "Summarise the player's improv style across the rounds, naming standout moments.",
        ))
        .phase(PhaseSpec::terminal("done", "Thank the player and close the show."))
        .phase(ended_early())
        .transition("intro", Transition::to("round_1", Gate::fields_present(&["player_name"])))
        .transition("round_1", Transition::to("round_2", Gate::TurnsInPhase(1)))
        .transition("round_2", Transition::to("round_3", Gate::TurnsInPhase(1)))
        .transition("round_3", Transition::to("summary", Gate::TurnsInPhase(1)))
        .transition("summary", Transition::to("done", Gate::TurnsInPhase(1)))
        .exit_phrases_only(&["stop game", "end show", "quit the game", "end the call"])
        .build()
}
