//! Keyword answer engine behind the bundled server
//!
//! Questions are matched case-insensitively, in this order: greetings,
//! knowledge base topics, subject keywords, then a generic fallback.

pub const GREETING: &str = "Hello! I'm your AI Tutoring Bot, here to help you learn and explore various subjects. I can assist with science, math, programming, history, and much more. What would you like to learn about today?";

const GREETING_WORDS: &[&str] = &["hello", "hi", "hey", "greetings"];

/// Topic -> fact, checked in order
const KNOWLEDGE_BASE: &[(&str, &str)] = &[
    (
        "photosynthesis",
        "Photosynthesis is the process by which plants use sunlight, water, and carbon dioxide to produce oxygen and energy in the form of sugar.",
    ),
    (
        "python",
        "Python is a high-level, interpreted programming language known for its simple syntax and versatility. It's great for beginners!",
    ),
    (
        "gravity",
        "Gravity is a force that attracts objects toward each other. On Earth, it gives weight to physical objects and causes them to fall toward the ground.",
    ),
    (
        "mitosis",
        "Mitosis is a process of cell division that results in two identical daughter cells. It has phases: prophase, metaphase, anaphase, and telophase.",
    ),
    (
        "algebra",
        "Algebra is a branch of mathematics dealing with symbols and the rules for manipulating those symbols to solve equations.",
    ),
    (
        "water cycle",
        "The water cycle describes how water evaporates from the surface, rises into the atmosphere, cools and condenses into clouds, and falls back as precipitation.",
    ),
    (
        "france",
        "The capital of France is Paris, known for the Eiffel Tower and rich cultural history.",
    ),
];

/// Subject -> keywords that point at it
const SUBJECTS: &[(&str, &[&str])] = &[
    ("math", &["math", "mathematics", "algebra", "geometry", "calculus"]),
    ("science", &["science", "physics", "chemistry", "biology"]),
    ("programming", &["programming", "coding", "python", "javascript", "java"]),
    ("history", &["history", "historical", "past events"]),
    ("geography", &["geography", "countries", "capitals"]),
];

/// Display names reported by `GET /status`
pub const SUBJECTS_SUPPORTED: &[&str] = &["Math", "Science", "Programming", "History", "Geography"];

/// Which rule produced an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Greeting,
    Topic(&'static str),
    Subject(&'static str),
    Fallback,
}

/// Pick the rule that answers `question`
pub fn route(question: &str) -> Route {
    let lower = question.to_lowercase();

    // Greetings match whole words so "this" or "which" don't count as "hi"
    let is_greeting = lower
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| GREETING_WORDS.contains(&word));
    if is_greeting {
        return Route::Greeting;
    }

    if let Some((topic, _)) = KNOWLEDGE_BASE.iter().find(|(topic, _)| lower.contains(topic)) {
        return Route::Topic(*topic);
    }

    if let Some((subject, _)) = SUBJECTS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
    {
        return Route::Subject(*subject);
    }

    Route::Fallback
}

/// Answer a (non-empty, trimmed) question
pub fn answer(question: &str) -> String {
    match route(question) {
        Route::Greeting => GREETING.to_string(),
        Route::Topic(topic) => {
            let fact = KNOWLEDGE_BASE
                .iter()
                .find(|(t, _)| *t == topic)
                .map(|(_, fact)| *fact)
                .unwrap_or_default();
            format!(
                "**{}**: {}\n\nWould you like me to explain any specific aspect of {} in more detail?",
                title_case(topic),
                fact,
                topic
            )
        }
        Route::Subject(subject) => format!(
            "I'd be happy to help you with {subject}! Could you be more specific about what you'd like to learn? For example, you could ask about specific concepts, theories, or applications in {subject}."
        ),
        Route::Fallback => format!(
            "Thank you for your question about '{}'. I'm designed to help students learn various subjects. I can provide explanations, examples, and guidance on topics like:\n\n\
             • Mathematics (algebra, geometry, calculus)\n\
             • Science (physics, chemistry, biology)\n\
             • Programming (Python, web development)\n\
             • History and social studies\n\
             • Language arts\n\n\
             Could you tell me which subject area you're most interested in, or ask me a more specific question?",
            question
        ),
    }
}

/// "water cycle" -> "Water Cycle"
fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
