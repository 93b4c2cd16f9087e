//! Prompts and response schemas for each assistant operation.
//!
//! Schemas use the uppercase OpenAPI subset accepted by `generateContent`'s
//! `responseSchema`; field names match the serde names in [`super::types`].

use chrono::{DateTime, Utc};
use serde_json::{Value, json};

use super::types::{PotentialLead, ProspectQuery};
use crate::funnel::LeadRecord;

fn string(description: &str) -> Value {
    json!({ "type": "STRING", "description": description })
}

fn strings(description: &str) -> Value {
    json!({ "type": "ARRAY", "items": { "type": "STRING" }, "description": description })
}

fn or_default<'a>(value: Option<&'a str>, fallback: &'a str) -> &'a str {
    value.map(str::trim).filter(|v| !v.is_empty()).unwrap_or(fallback)
}

pub fn prospect_search(query: &ProspectQuery) -> String {
    let offset = query.offset();
    let segment_line = match query.custom_segment() {
        Some(custom) => format!(
            "Custom segment: \"{custom}\" (typed by the user; interpret it semantically, \
             including synonyms and equivalent categories)"
        ),
        None => format!("Segment: \"{}\"", query.segment),
    };

    format!(
        "You are a B2B prospecting assistant for a label and packaging print shop. \
         Find real companies in Brazil matching these criteria.\n\
         - {segment_line}\n\
         - Niche within the segment: \"{niche}\"\n\
         - Base location: \"{city}, {state}\"\n\
         - Search radius: \"{radius}\"\n\
         - Extra keywords: \"{keywords}\"\n\
         Combine every criterion, search public sources such as Google Search and Google Maps, \
         merge and deduplicate the results, then return only positions {first} to {last} of the \
         final list, and estimate the total number of unique companies found.\n\
         For each company report public commercial contacts, the labels it most likely uses, the \
         recommended substrate and estimates of volume and purchase frequency (low, medium, high).\n\
         Never invent data: only real companies and public information, null when unknown. \
         Answer in Brazilian Portuguese.",
        niche = or_default(query.niche.as_deref(), "not specified"),
        city = query.city,
        state = query.state,
        radius = or_default(query.radius.as_deref(), "Apenas na cidade"),
        keywords = or_default(query.keywords.as_deref(), "none"),
        first = offset + 1,
        last = offset + query.limit,
    )
}

pub fn prospect_search_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "total_found": { "type": "INTEGER", "description": "Estimated unique companies before pagination" },
            "prospects": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": string("Company name"),
                        "segment": string("Business segment"),
                        "phone": string("Public commercial phone"),
                        "site": string("Official website"),
                        "instagram": string("Public Instagram profile"),
                        "products_used": string("Labels the company likely uses"),
                        "recommended_substrate": string("Ideal substrates for those labels"),
                        "estimated_volume": string("low, medium or high"),
                        "purchase_frequency": string("low, medium or high")
                    },
                    "required": ["name", "segment", "products_used", "recommended_substrate", "estimated_volume", "purchase_frequency"]
                }
            }
        },
        "required": ["total_found", "prospects"]
    })
}

pub fn scripts(lead: &PotentialLead) -> String {
    format!(
        "You are a sales specialist for the label printing industry. Write outreach scripts for \
         \"{name}\", a company in the \"{segment}\" segment that likely uses \"{products}\" on \
         substrates such as \"{substrate}\".\n\
         1. WhatsApp: a short, friendly message addressing a pain point of the segment.\n\
         2. Phone: a 20 second pitch to book a conversation.\n\
         3. Email: a direct, professional introduction.\n\
         Answer in Brazilian Portuguese.",
        name = lead.name,
        segment = lead.segment,
        products = lead.products_used,
        substrate = lead.recommended_substrate,
    )
}

pub fn scripts_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "whatsapp": string("Short WhatsApp message"),
            "phone": string("20 second cold-call pitch"),
            "email": string("Introduction email")
        },
        "required": ["whatsapp", "phone", "email"]
    })
}

pub fn lead_analysis(lead: &PotentialLead) -> String {
    format!(
        "Act as a senior sales engineer specialised in packaging, labels and adhesive stock. \
         Analyse this prospect in depth:\n\
         - Company: \"{name}\"\n\
         - Segment: \"{segment}\"\n\
         - Location: \"{city}, {state}\"\n\
         - Likely products: \"{products}\"\n\
         - Suggested substrate: \"{substrate}\"\n\
         Provide a technical diagnosis of the exact materials the segment requires, the commercial \
         opportunity and why they would switch suppliers, high-conversion scripts with objection \
         handling, and three typical decision-maker roles with LinkedIn search URLs plus the \
         company's likely LinkedIn page. Use correct technical vocabulary (BOPP, hotmelt, acrylic, \
         liner). Answer in Brazilian Portuguese.",
        name = lead.name,
        segment = lead.segment,
        city = lead.city,
        state = lead.state,
        products = lead.products_used,
        substrate = lead.recommended_substrate,
    )
}

pub fn lead_analysis_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "technical": {
                "type": "OBJECT",
                "properties": {
                    "probable_materials": strings("Three or four probable materials"),
                    "usage_evidence": string("Why the segment uses these materials"),
                    "potential_risks": strings("Two technical or commercial risks")
                },
                "required": ["probable_materials", "usage_evidence", "potential_risks"]
            },
            "commercial": {
                "type": "OBJECT",
                "properties": {
                    "opportunity_summary": string("One-sentence opportunity summary"),
                    "key_benefits": strings("Three selling arguments")
                },
                "required": ["opportunity_summary", "key_benefits"]
            },
            "scripts": {
                "type": "OBJECT",
                "properties": {
                    "whatsapp": string("WhatsApp approach aiming at a meeting"),
                    "phone_pitch": string("30 second cold-call script"),
                    "email_template": string("Formal B2B cold email"),
                    "objections_handling": {
                        "type": "ARRAY",
                        "items": {
                            "type": "OBJECT",
                            "properties": {
                                "objection": string("Likely objection"),
                                "response": string("Answer to the objection")
                            }
                        }
                    }
                },
                "required": ["whatsapp", "phone_pitch", "email_template", "objections_handling"]
            },
            "connections": {
                "type": "OBJECT",
                "properties": {
                    "linkedin_company_url": string("Probable company LinkedIn URL"),
                    "potential_decisors": {
                        "type": "ARRAY",
                        "items": {
                            "type": "OBJECT",
                            "properties": {
                                "name": string("Example name or initials"),
                                "role": string("Strategic role"),
                                "linkedin_url": string("LinkedIn search URL for the role")
                            },
                            "required": ["name", "role", "linkedin_url"]
                        }
                    },
                    "influence_map": string("Approach recommendation by role")
                },
                "required": ["linkedin_company_url", "potential_decisors", "influence_map"]
            }
        },
        "required": ["technical", "commercial", "scripts", "connections"]
    })
}

pub fn voice_command(text: &str) -> String {
    format!(
        "Interpret this spoken prospecting request and extract the search parameters.\n\
         Command: \"{text}\"\n\
         Return the prospect type (comercial or industrial), the business segment, the city and \
         the two-letter state code."
    )
}

pub fn voice_command_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "prospect_type": { "type": "STRING", "enum": ["comercial", "industrial"] },
            "segment": string("Business segment"),
            "city": string("City to search"),
            "state": string("Two-letter state code")
        },
        "required": ["prospect_type", "segment", "city", "state"]
    })
}

pub fn niches(subject: &str) -> String {
    format!(
        "For the business segment \"{subject}\", list 5 to 8 more specific market niches. \
         Answer in Brazilian Portuguese."
    )
}

pub fn niches_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": { "niches": strings("Five to eight niches within the segment") },
        "required": ["niches"]
    })
}

pub fn lead_suggestions(lead: &LeadRecord, now: DateTime<Utc>) -> String {
    let idle_days = (now - lead.last_interaction).num_days();
    format!(
        "You are a sales assistant for a label print shop. Suggest the next step for this lead:\n\
         - Company: {name}\n\
         - Segment: {segment}\n\
         - Days since last interaction: {idle_days}\n\
         - Digital presence: {presence}\n\
         Raise an alert when the last interaction is older than 15 days. \
         Answer in Brazilian Portuguese.",
        name = lead.name,
        segment = lead.segment,
        presence = or_default(lead.digital_presence.as_deref(), "not informed"),
    )
}

pub fn lead_suggestions_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "next_action": string("Best next action"),
            "whatsapp_message": string("Short personalised WhatsApp message"),
            "alert": string("Alert for a stale lead, or null"),
            "approach_title": string("Personalised approach title"),
            "low_data_tips": strings("Tips for finding alternative contacts")
        },
        "required": ["next_action", "whatsapp_message", "approach_title"]
    })
}

pub fn additional_data(lead: &LeadRecord) -> String {
    format!(
        "Act as a B2B data researcher for the company \"{name}\" in \"{city}, {state}\". \
         Suggest a likely commercial phone, name variations, an alternative address, a direct \
         Google Maps search link, a trade association and advanced search terms.",
        name = lead.name,
        city = lead.city,
        state = lead.state,
    )
}

pub fn additional_data_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "suggested_phone": string("Probable commercial phone"),
            "name_variations": strings("Variations of the company name"),
            "alternative_address": string("Alternative address"),
            "google_maps_search": string("Direct Google Maps search link"),
            "association_suggestion": string("Trade association or union"),
            "suggested_search_terms": strings("Advanced search terms")
        },
        "required": ["name_variations", "google_maps_search", "suggested_search_terms"]
    })
}
