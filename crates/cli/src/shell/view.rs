use exprscope_core::CodeCompletion;
use exprscope_core::variables::Variable;
use tabled::Tabled;

/// A terminal row for one completion candidate
#[derive(Tabled)]
pub struct CompletionView {
    pub kind: String,
    pub text: String,
    pub display: String,
    pub replaces: String,
}

impl CompletionView {
    pub fn from_completion(completion: &CodeCompletion) -> Self {
        Self {
            kind: completion.kind.label().to_string(),
            text: completion.text.clone(),
            display: completion.display_text.clone(),
            replaces: format!("{}..{}", completion.insertion_start, completion.insertion_end),
        }
    }
}

/// A terminal row for one caller variable
#[derive(Tabled)]
pub struct VariableView {
    pub name: String,
    #[tabled(rename = "type")]
    pub ty: String,
    pub value: String,
    #[tabled(rename = "final")]
    pub is_final: bool,
}

impl VariableView {
    pub fn from_variable(variable: &Variable) -> Self {
        Self {
            name: variable.name.clone(),
            ty: variable.declared_type.to_string(),
            value: variable.get().to_string(),
            is_final: variable.is_final,
        }
    }
}
