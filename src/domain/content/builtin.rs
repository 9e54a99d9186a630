//! Built-in content used when no content file is provided.

use crate::domain::foundation::AgentVariant;

use super::item::{ContentItem, FraudCase, Faq, Product, Recipe, Scenario};

/// Default content for a variant. Variants without content get none.
pub fn builtin_content(variant: AgentVariant) -> Vec<ContentItem> {
    match variant {
        AgentVariant::ImprovBattle => improv_scenarios(),
        AgentVariant::LeadCapture => sdr_faqs(),
        AgentVariant::GroceryOrder => grocery_catalog(),
        AgentVariant::Commerce => merch_catalog(),
        AgentVariant::FraudAlert => fraud_cases(),
        _ => Vec::new(),
    }
}

fn scenario(id: &str, prompt: &str) -> ContentItem {
    ContentItem::Scenario(Scenario {
        id: id.to_string(),
        prompt: prompt.to_string(),
    })
}

fn improv_scenarios() -> Vec<ContentItem> {
    vec![
        scenario(
            "barista_portal",
            "You are a barista who must calmly explain to a customer that their latte is actually a portal to another dimension.",
        ),
        scenario(
            "time_travel_guide",
            "You are a time-traveling tour guide explaining modern smartphones to someone from the 1800s.",
        ),
        scenario(
            "escaped_order",
            "You are a restaurant waiter who must politely inform a customer that their order has escaped the kitchen and is now loose in the dining room.",
        ),
        scenario(
            "cursed_return",
            "You are a customer trying to return an obviously cursed object to a very skeptical shop owner.",
        ),
        scenario(
            "alien_job_interview",
            "You are a human resources manager interviewing an alien who has never had a job before.",
        ),
    ]
}

fn faq(question: &str, answer: &str, tags: &[&str]) -> ContentItem {
    ContentItem::Faq(Faq {
        question: question.to_string(),
        answer: answer.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
    })
}

fn sdr_faqs() -> Vec<ContentItem> {
    vec![
        faq(
            "What does your product do?",
            "We provide a trading and investment platform for stocks, mutual funds and ETFs with low brokerage.",
            &["product", "platform", "overview"],
        ),
        faq(
            "How much does it cost?",
            "Equity delivery is free. Intraday and F&O trades are charged a flat fee per executed order.",
            &["pricing", "price", "brokerage", "fees"],
        ),
        faq(
            "How do I open an account?",
            "Account opening is fully online and usually completes within two working days after document verification.",
            &["account", "signup", "onboarding"],
        ),
        faq(
            "Do you offer APIs for developers?",
            "Yes, a paid trading API lets teams build their own trading and portfolio tools.",
            &["api", "developers", "integration"],
        ),
        faq(
            "Is my money safe?",
            "Client funds are held with the clearing corporation and securities stay in your own demat account.",
            &["security", "safety", "funds"],
        ),
    ]
}

fn product(id: &str, name: &str, category: &str, price: u64, tags: &[&str]) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        description: String::new(),
        category: category.to_string(),
        color: None,
        price,
        currency: "INR".to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}

fn recipe(name: &str, item_ids: &[&str]) -> ContentItem {
    ContentItem::Recipe(Recipe {
        name: name.to_string(),
        item_ids: item_ids.iter().map(|id| id.to_string()).collect(),
    })
}

fn grocery_catalog() -> Vec<ContentItem> {
    let items = [
        product("bread", "Whole Wheat Bread", "bakery", 45, &["breakfast", "sandwich"]),
        product("eggs", "Farm Eggs (6)", "dairy", 60, &["breakfast", "protein"]),
        product("milk", "Toned Milk 1L", "dairy", 56, &["breakfast", "tea"]),
        product("butter", "Salted Butter 100g", "dairy", 58, &["breakfast", "sandwich"]),
        product("pasta", "Penne Pasta 500g", "pantry", 110, &["italian", "dinner"]),
        product("tomato_sauce", "Tomato Basil Sauce", "pantry", 150, &["italian", "pasta"]),
        product("cheese", "Cheddar Slices", "dairy", 120, &["sandwich", "snack"]),
        product("peanut_butter", "Crunchy Peanut Butter", "pantry", 199, &["sandwich", "snack"]),
        product("apples", "Shimla Apples 1kg", "produce", 180, &["fruit", "snack"]),
        product("chips", "Salted Potato Chips", "snacks", 20, &["snack", "party"]),
    ];

    items
        .into_iter()
        .map(ContentItem::Product)
        .chain([
            recipe("peanut butter sandwich", &["bread", "peanut_butter"]),
            recipe("pasta for two", &["pasta", "tomato_sauce", "cheese"]),
            recipe("breakfast", &["bread", "eggs", "milk", "butter"]),
        ])
        .collect()
}

fn merch(id: &str, name: &str, category: &str, color: &str, price: u64, description: &str) -> ContentItem {
    ContentItem::Product(Product {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        category: category.to_string(),
        color: Some(color.to_string()),
        price,
        currency: "INR".to_string(),
        tags: Vec::new(),
    })
}

fn merch_catalog() -> Vec<ContentItem> {
    vec![
        merch("mug-001", "Stoneware Coffee Mug", "mug", "white", 800, "A classic 350ml stoneware mug."),
        merch("mug-002", "Travel Mug", "mug", "black", 1200, "Insulated steel mug with a leak-proof lid."),
        merch("hoodie-001", "Everyday Hoodie", "hoodie", "black", 1800, "Fleece-lined cotton hoodie."),
        merch("hoodie-002", "Zip Hoodie", "hoodie", "grey", 2200, "Lightweight zip-up hoodie."),
        merch("tshirt-001", "Logo T-Shirt", "tshirt", "blue", 600, "Soft cotton tee with a small logo."),
        merch("tshirt-002", "Graphic T-Shirt", "tshirt", "white", 750, "Printed cotton tee."),
        merch("cap-001", "Baseball Cap", "cap", "black", 500, "Adjustable cotton cap."),
    ]
}

fn fraud_cases() -> Vec<ContentItem> {
    vec![
        ContentItem::FraudCase(FraudCase {
            case_id: "FC-1001".to_string(),
            user_name: "Ravi".to_string(),
            security_question: "What is the name of your first school?".to_string(),
            security_answer: "St. Mary's".to_string(),
            merchant: "ElectroMart Online".to_string(),
            amount: 45999,
            currency: "INR".to_string(),
            location: "Bengaluru".to_string(),
            time: "2024-01-14 23:47".to_string(),
            card_ending: "4821".to_string(),
        }),
        ContentItem::FraudCase(FraudCase {
            case_id: "FC-1002".to_string(),
            user_name: "Priya".to_string(),
            security_question: "In which city were you born?".to_string(),
            security_answer: "Pune".to_string(),
            merchant: "GlobalTravels".to_string(),
            amount: 82500,
            currency: "INR".to_string(),
            location: "Dubai".to_string(),
            time: "2024-01-15 03:12".to_string(),
            card_ending: "1177".to_string(),
        }),
    ]
}
