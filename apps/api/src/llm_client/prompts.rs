// Prompt fragments shared by every assessor prompt.
// The prompts themselves live in assessment::prompts.

/// Response-shape hint sent with every request.
pub const JSON_RESPONSE_MIME_TYPE: &str = "application/json";

/// Persona line that opens every assessor prompt.
pub const ASSESSOR_PERSONA: &str =
    "You are a VET assessor for TAE40122 Cert IV in Training and Assessment.";

/// Common instruction appended to every prompt that expects a JSON object back.
pub const JSON_ONLY_INSTRUCTION: &str = "\
    Respond with a single valid JSON object only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";
