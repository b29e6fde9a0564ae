use crate::config::templates_file::{FlowTemplate, TemplateStep};
use crate::shared::ids::{ResourceId, StepId};
use serde_json::{Map, Value};

fn template_step(
    id: &str,
    name: &str,
    description: &str,
    action: &str,
    service: &str,
    depends_on: &[&str],
) -> TemplateStep {
    TemplateStep {
        id: StepId::parse(id).expect("builtin step id is valid"),
        name: name.to_string(),
        description: description.to_string(),
        action: action.to_string(),
        service: service.to_string(),
        parameters: Map::new(),
        depends_on: depends_on
            .iter()
            .map(|dep| StepId::parse(dep).expect("builtin step dependency is valid"))
            .collect(),
    }
}

fn resource(id: &str) -> ResourceId {
    ResourceId::parse(id).expect("builtin resource id is valid")
}

fn tags(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

/// The templates shipped with the crate: the travel-booking flows the
/// system was originally built around, plus the swap-checkout and
/// scheduling flows. Callers with their own catalog load a
/// `FlowTemplateFile` instead.
pub fn builtin_flow_templates() -> Vec<FlowTemplate> {
    vec![
        FlowTemplate {
            id: "standard-travel-booking".to_string(),
            name: "Standard Travel Booking".to_string(),
            description: "Book flight and hotel in sequence".to_string(),
            trigger_tags: tags(&["travel", "trip", "flight", "hotel", "book"]),
            required_resources: vec![resource("flight-api"), resource("hotel-api")],
            estimated_duration_seconds: 3600,
            steps: vec![
                template_step(
                    "search-flights",
                    "Search flights",
                    "Find candidate flights for the trip",
                    "search",
                    "flight",
                    &[],
                ),
                template_step(
                    "book-flight",
                    "Book flight",
                    "Book the best candidate flight",
                    "book",
                    "flight",
                    &["search-flights"],
                ),
                template_step(
                    "book-hotel",
                    "Book hotel",
                    "Book a hotel for the travel dates",
                    "book",
                    "hotel",
                    &["book-flight"],
                ),
            ],
        },
        FlowTemplate {
            id: "travel-with-visa".to_string(),
            name: "Travel Booking With Visa".to_string(),
            description: "Book flight and hotel, then file the visa application".to_string(),
            trigger_tags: tags(&["visa", "travel", "trip", "flight", "hotel"]),
            required_resources: vec![
                resource("flight-api"),
                resource("hotel-api"),
                resource("visa-api"),
            ],
            estimated_duration_seconds: 7200,
            steps: vec![
                template_step(
                    "search-flights",
                    "Search flights",
                    "Find candidate flights for the trip",
                    "search",
                    "flight",
                    &[],
                ),
                template_step(
                    "book-flight",
                    "Book flight",
                    "Book the best candidate flight",
                    "book",
                    "flight",
                    &["search-flights"],
                ),
                template_step(
                    "book-hotel",
                    "Book hotel",
                    "Book a hotel for the travel dates",
                    "book",
                    "hotel",
                    &["book-flight"],
                ),
                template_step(
                    "apply-visa",
                    "Apply for visa",
                    "File the visa application with the booked itinerary",
                    "apply",
                    "visa",
                    &["book-flight", "book-hotel"],
                ),
            ],
        },
        FlowTemplate {
            id: "swap-and-checkout".to_string(),
            name: "Token Swap Checkout".to_string(),
            description: "Swap tokens and complete the checkout".to_string(),
            trigger_tags: tags(&["swap", "token", "checkout", "pay"]),
            required_resources: vec![resource("dex-api"), resource("checkout-api")],
            estimated_duration_seconds: 600,
            steps: vec![
                template_step(
                    "swap-tokens",
                    "Swap tokens",
                    "Swap into the settlement token",
                    "swap",
                    "swap",
                    &[],
                ),
                template_step(
                    "checkout",
                    "Checkout",
                    "Settle the purchase with the swapped tokens",
                    "checkout",
                    "checkout",
                    &["swap-tokens"],
                ),
            ],
        },
        FlowTemplate {
            id: "schedule-meeting".to_string(),
            name: "Schedule Meeting".to_string(),
            description: "Find a slot and put the meeting on the calendar".to_string(),
            trigger_tags: tags(&["meeting", "schedule", "calendar"]),
            required_resources: vec![resource("calendar-api")],
            estimated_duration_seconds: 300,
            steps: vec![template_step(
                "schedule-meeting",
                "Schedule meeting",
                "Create the calendar event with all attendees",
                "schedule",
                "calendar",
                &[],
            )],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::templates_file::FlowTemplateFile;

    #[test]
    fn builtin_templates_pass_structural_validation() {
        let file = FlowTemplateFile {
            templates: builtin_flow_templates(),
        };
        file.validate().expect("builtin templates are valid");
    }

    #[test]
    fn builtin_travel_template_declares_resources_in_order() {
        let templates = builtin_flow_templates();
        let travel = templates
            .iter()
            .find(|template| template.id == "standard-travel-booking")
            .expect("travel template present");
        let declared: Vec<&str> = travel
            .required_resources
            .iter()
            .map(|id| id.as_str())
            .collect();
        assert_eq!(declared, vec!["flight-api", "hotel-api"]);
    }
}
