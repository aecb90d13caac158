//! Fixed prompt templates and placeholder rendering

macro_rules! prompt_file
{ ($name:literal) => {
    include_str!(concat!(
      env!("CARGO_MANIFEST_DIR")
    , "/prompts/"
    , $name
    , ".txt"
    ))
  };
}

/// Persona sent as the system message. Rendered verbatim.
pub const SYSTEM_TEMPLATE: &str = prompt_file!("system");

/// User message wrapper. Holds exactly one `{input}` placeholder.
pub const USER_TEMPLATE: &str = prompt_file!("user");

/// Substitution key recorded in the prompt inputs
pub const INPUT_KEY: &str = "input";

/// Literal placeholder text inside [`USER_TEMPLATE`]
pub const INPUT_PLACEHOLDER: &str = "{input}";

/// Replace the first `{input}` placeholder of `template` with `input`.
/// Text inside `input` is never re-scanned, so user text containing
/// `{input}` is inserted literally.
pub fn render(template: &str, input: &str) -> String
{   template.replacen(INPUT_PLACEHOLDER, input, 1)
}

#[cfg(test)]
mod tests
{   use super::*;

    #[test]
    fn user_template_has_single_placeholder()
    {   assert_eq!(USER_TEMPLATE.matches(INPUT_PLACEHOLDER).count(), 1);
    }

    #[test]
    fn system_template_has_no_placeholder()
    {   assert!(!SYSTEM_TEMPLATE.contains(INPUT_PLACEHOLDER));
        assert!(SYSTEM_TEMPLATE.contains("React"));
    }

    #[test]
    fn render_substitutes_exactly_the_input()
    {   let rendered = render(USER_TEMPLATE, "Hello");
        let (before, after) = USER_TEMPLATE
          .split_once(INPUT_PLACEHOLDER)
          .unwrap();
        assert_eq!(rendered, format!("{}Hello{}", before, after));
        assert!(!rendered.contains(INPUT_PLACEHOLDER));
    }

    #[test]
    fn render_inserts_braces_literally()
    {   let rendered = render(USER_TEMPLATE, "{input} and {other}");
        assert!(rendered.contains(
          "Considering the following context: {input} and {other},"
        ));
    }

    #[test]
    fn render_accepts_empty_input()
    {   let rendered = render(USER_TEMPLATE, "");
        assert!(rendered.contains("Considering the following context: ,"));
    }
}
