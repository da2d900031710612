use itertools::Itertools as _;

use super::{Request, MAX_RECOMMENDATIONS};

/// Renders the instruction text sent to the generation backend.
pub fn render(request: &Request) -> String {
    let purchases = match non_empty(&request.past_purchases) {
        Some(purchases) => {
            format!("Past ticket purchases: {}.", purchases.iter().join(", "))
        }
        None => "No past purchases available.".to_string(),
    };
    let preferences = match non_empty(&request.preferences) {
        Some(preferences) => {
            format!("User preferences: {}.", preferences.iter().join(", "))
        }
        None => "No specific preferences provided.".to_string(),
    };
    let events = request
        .upcoming_events
        .iter()
        .map(|event| {
            format!(
                "- ID: {}, Name: {}, Date: {}, Category: {}, Description: {}",
                event.id,
                event.name,
                event.date,
                event.category,
                event.description,
            )
        })
        .join("\n");

    format!(
        "You are an AI assistant specialized in recommending university \
         events.\n\
         Your goal is to suggest relevant upcoming events to a user based on \
         their past activity and preferences.\n\n\
         User ID: {user_id}\n\n\
         {purchases}\n\n\
         {preferences}\n\n\
         Available upcoming events:\n\
         {events}\n\n\
         Based on the user's past purchases and preferences, and from the \
         list of upcoming events, recommend up to {MAX_RECOMMENDATIONS} \
         events that the user is most likely to be interested in.\n\
         For each recommendation, provide a brief reason why it is \
         recommended, focusing on the user's explicit or implicit interests. \
         Only recommend events from the 'Available upcoming events' list.\n\n\
         Respond with JSON only, shaped as \
         {{\"recommendations\": [{{\"id\": string, \"name\": string, \
         \"date\": string, \"category\": string, \"description\": string, \
         \"reason\": string}}]}}.\n",
        user_id = request.user_id,
    )
}

fn non_empty(labels: &Option<Vec<String>>) -> Option<&[String]> {
    labels.as_deref().filter(|labels| !labels.is_empty())
}

#[cfg(test)]
mod tests {
    use crate::{
        catalog::Catalog,
        recommend::{Request, UserProfile},
    };

    use super::*;

    #[test]
    fn lists_history_and_preferences() {
        let request = Request::new(
            UserProfile {
                user_id: "user_123".to_string(),
                past_purchases: Some(vec![
                    "Future AI Summit".to_string(),
                    "Startup Networking Night".to_string(),
                ]),
                preferences: Some(vec!["Music".to_string()]),
            },
            &Catalog::mock(),
        );
        let prompt = render(&request);

        assert!(prompt.contains("User ID: user_123\n"));
        assert!(prompt.contains(
            "Past ticket purchases: Future AI Summit, Startup Networking Night."
        ));
        assert!(prompt.contains("User preferences: Music."));
        assert!(prompt.contains(
            "- ID: 4, Name: Inter-Uni Athletics Meet, Date: 2025-06-10, \
             Category: Sports, Description: Witness"
        ));
        assert!(prompt.contains("recommend up to 5 events"));
        assert!(!prompt.contains("No past purchases available."));
    }

    #[test]
    fn states_missing_history_and_preferences() {
        let request = Request::new(
            UserProfile {
                user_id: "user_9".to_string(),
                past_purchases: None,
                preferences: Some(Vec::new()),
            },
            &Catalog::mock(),
        );
        let prompt = render(&request);

        assert!(prompt.contains("No past purchases available."));
        assert!(prompt.contains("No specific preferences provided."));
        assert_eq!(prompt.matches("\n- ID: ").count(), 6);
        assert!(prompt.contains(
            "User ID: user_9\n\n\
             No past purchases available.\n\n\
             No specific preferences provided.\n\n\
             Available upcoming events:\n- ID: 1, "
        ));
    }
}
