pub fn to_title_case(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut at_run_start = true;
    for character in value.chars() {
        if character.is_whitespace() {
            result.push(character);
            at_run_start = true;
        } else if at_run_start {
            result.extend(character.to_uppercase());
            at_run_start = false;
        } else {
            result.extend(character.to_lowercase());
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalizes_each_word_and_lowers_the_rest() {
        assert_eq!(to_title_case("the STUDIO ep"), "The Studio Ep");
        assert_eq!(to_title_case("PRACTICE 30 MIN"), "Practice 30 Min");
    }

    #[test]
    fn keeps_whitespace_layout() {
        assert_eq!(to_title_case("  walk\tmel  "), "  Walk\tMel  ");
        assert_eq!(to_title_case(""), "");
    }

    #[test]
    fn non_letters_at_run_start_are_left_alone() {
        assert_eq!(to_title_case("(urgent) CALL"), "(urgent) Call");
        assert_eq!(to_title_case("2nd COFFEE"), "2nd Coffee");
    }
}
