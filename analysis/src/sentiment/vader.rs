//! Rule-based valence scoring in the style of VADER (Hutto & Gilbert, 2014).
//!
//! Tuned for short social and news text: no training and no learned
//! parameters, just a valence lexicon plus heuristics for boosters,
//! negation, capitalisation, contrast and punctuation emphasis.

use super::Lexicon;
use crate::models::SentimentScores;

const B_INCR: f64 = 0.293;
const B_DECR: f64 = -0.293;
const C_INCR: f64 = 0.733;
const N_SCALAR: f64 = -0.74;
const NORMALIZE_ALPHA: f64 = 15.0;

const NEGATE: &[&str] = &[
    "aint", "arent", "cannot", "cant", "couldnt", "darent", "didnt", "doesnt", "ain't",
    "aren't", "can't", "couldn't", "daren't", "didn't", "doesn't", "dont", "hadnt", "hasnt",
    "havent", "isnt", "mightnt", "mustnt", "neither", "don't", "hadn't", "hasn't", "haven't",
    "isn't", "mightn't", "mustn't", "neednt", "needn't", "never", "none", "nope", "nor", "not",
    "nothing", "nowhere", "oughtnt", "shant", "shouldnt", "uhuh", "wasnt", "werent", "oughtn't",
    "shan't", "shouldn't", "uh-uh", "wasn't", "weren't", "without", "wont", "wouldnt", "won't",
    "wouldn't", "rarely", "seldom", "despite",
];

fn booster(word: &str) -> Option<f64> {
    match word {
        "absolutely" | "amazingly" | "awfully" | "completely" | "considerable"
        | "considerably" | "decidedly" | "deeply" | "effing" | "enormous" | "enormously"
        | "entirely" | "especially" | "exceptional" | "exceptionally" | "extreme"
        | "extremely" | "fabulously" | "flipping" | "flippin" | "frackin" | "fracking"
        | "fricking" | "frickin" | "frigging" | "friggin" | "fully" | "greatly" | "hella"
        | "highly" | "hugely" | "incredible" | "incredibly" | "intensely" | "major"
        | "majorly" | "more" | "most" | "particularly" | "purely" | "quite" | "really"
        | "remarkably" | "so" | "substantially" | "thoroughly" | "total" | "totally"
        | "tremendous" | "tremendously" | "uber" | "unbelievably" | "unusually" | "utter"
        | "utterly" | "very" => Some(B_INCR),
        "almost" | "barely" | "hardly" | "just enough" | "kind of" | "kinda" | "kindof"
        | "kind-of" | "less" | "little" | "marginal" | "marginally" | "occasional"
        | "occasionally" | "partly" | "scarce" | "scarcely" | "slight" | "slightly"
        | "somewhat" | "sort of" | "sorta" | "sortof" | "sort-of" => Some(B_DECR),
        _ => None,
    }
}

fn special_case(phrase: &str) -> Option<f64> {
    match phrase {
        "the shit" | "the bomb" => Some(3.0),
        "bad ass" | "badass" => Some(1.5),
        "bus stop" => Some(0.0),
        "yeah right" => Some(-2.0),
        "kiss of death" => Some(-1.5),
        "to die for" => Some(3.0),
        "beating heart" => Some(3.1),
        "broken heart" => Some(-2.9),
        _ => None,
    }
}

fn negated(word: &str) -> bool {
    NEGATE.contains(&word) || word.contains("n't")
}

/// At least one cased character and no lowercase ones
fn is_upper(word: &str) -> bool {
    word.chars().any(char::is_uppercase) && !word.chars().any(char::is_lowercase)
}

fn strip_punc_if_word(token: &str) -> &str {
    let stripped = token.trim_matches(|c: char| c.is_ascii_punctuation());
    if stripped.chars().count() <= 2 {
        token
    } else {
        stripped
    }
}

/// Tokenised view of the input text
struct SentiText<'a> {
    words: Vec<&'a str>,
    lower: Vec<String>,
    is_cap_diff: bool,
}

impl<'a> SentiText<'a> {
    fn new(text: &'a str) -> Self {
        let words: Vec<&str> = text.split_whitespace().map(strip_punc_if_word).collect();
        let lower = words.iter().map(|w| w.to_lowercase()).collect();
        let all_caps = words.iter().filter(|w| is_upper(w)).count();
        let cap_differential = words.len() - all_caps;
        Self {
            is_cap_diff: cap_differential > 0 && cap_differential < words.len(),
            words,
            lower,
        }
    }

    fn len(&self) -> usize {
        self.words.len()
    }
}

/// Score `text` against `lexicon`.
///
/// Text without any tokens yields all-zero proportions; callers wanting the
/// neutral convention for blank input handle that before calling.
pub fn polarity_scores(lexicon: &Lexicon, text: &str) -> SentimentScores {
    let senti = SentiText::new(text);
    let mut sentiments = Vec::with_capacity(senti.len());

    for i in 0..senti.len() {
        let lower = senti.lower[i].as_str();
        if booster(lower).is_some() {
            sentiments.push(0.0);
            continue;
        }
        if i + 1 < senti.len() && lower == "kind" && senti.lower[i + 1] == "of" {
            sentiments.push(0.0);
            continue;
        }
        sentiments.push(sentiment_valence(lexicon, &senti, i));
    }

    but_check(&senti.lower, &mut sentiments);
    score_valence(&sentiments, text)
}

fn sentiment_valence(lexicon: &Lexicon, senti: &SentiText<'_>, i: usize) -> f64 {
    let lower = &senti.lower;
    let Some(base) = lexicon.valence(&lower[i]) else {
        return 0.0;
    };
    let mut valence = base;

    // "no" as a determiner in front of another sentiment word carries no valence itself
    if lower[i] == "no" && i + 1 < senti.len() && lexicon.contains(&lower[i + 1]) {
        valence = 0.0;
    }
    if (i > 0 && lower[i - 1] == "no")
        || (i > 1 && lower[i - 2] == "no")
        || (i > 2 && lower[i - 3] == "no" && matches!(lower[i - 1].as_str(), "or" | "nor"))
    {
        valence = base * N_SCALAR;
    }

    if is_upper(senti.words[i]) && senti.is_cap_diff {
        if valence > 0.0 {
            valence += C_INCR;
        } else {
            valence -= C_INCR;
        }
    }

    for start_i in 0..3 {
        if i > start_i && !lexicon.contains(&lower[i - (start_i + 1)]) {
            let mut s = scalar_inc_dec(senti.words[i - (start_i + 1)], valence, senti.is_cap_diff);
            if start_i == 1 && s != 0.0 {
                s *= 0.95;
            }
            if start_i == 2 && s != 0.0 {
                s *= 0.9;
            }
            valence += s;
            valence = negation_check(valence, lower, start_i, i);
            if start_i == 2 {
                valence = special_idioms_check(valence, lower, i);
            }
        }
    }

    least_check(valence, lexicon, lower, i)
}

fn scalar_inc_dec(word: &str, valence: f64, is_cap_diff: bool) -> f64 {
    let Some(mut scalar) = booster(&word.to_lowercase()) else {
        return 0.0;
    };
    if valence < 0.0 {
        scalar *= -1.0;
    }
    if is_upper(word) && is_cap_diff {
        if valence > 0.0 {
            scalar += C_INCR;
        } else {
            scalar -= C_INCR;
        }
    }
    scalar
}

fn negation_check(valence: f64, lower: &[String], start_i: usize, i: usize) -> f64 {
    let so_or_this = |w: &str| w == "so" || w == "this";
    match start_i {
        0 => {
            if negated(&lower[i - 1]) {
                return valence * N_SCALAR;
            }
        }
        1 => {
            if lower[i - 2] == "never" && so_or_this(&lower[i - 1]) {
                return valence * 1.25;
            } else if lower[i - 2] == "without" && lower[i - 1] == "doubt" {
                return valence;
            } else if negated(&lower[i - 2]) {
                return valence * N_SCALAR;
            }
        }
        _ => {
            if lower[i - 3] == "never" && (so_or_this(&lower[i - 2]) || so_or_this(&lower[i - 1])) {
                return valence * 1.25;
            } else if lower[i - 3] == "without"
                && (lower[i - 2] == "doubt" || lower[i - 1] == "doubt")
            {
                return valence;
            } else if negated(&lower[i - 3]) {
                return valence * N_SCALAR;
            }
        }
    }
    valence
}

/// Idioms ending at or starting from position `i`, plus two-word dampeners.
/// Only reached with `i >= 3`.
fn special_idioms_check(mut valence: f64, lower: &[String], i: usize) -> f64 {
    let onezero = format!("{} {}", lower[i - 1], lower[i]);
    let twoonezero = format!("{} {} {}", lower[i - 2], lower[i - 1], lower[i]);
    let twoone = format!("{} {}", lower[i - 2], lower[i - 1]);
    let threetwoone = format!("{} {} {}", lower[i - 3], lower[i - 2], lower[i - 1]);
    let threetwo = format!("{} {}", lower[i - 3], lower[i - 2]);

    if let Some(v) = [&onezero, &twoonezero, &twoone, &threetwoone, &threetwo]
        .iter()
        .find_map(|seq| special_case(seq))
    {
        valence = v;
    }
    if i + 1 < lower.len() {
        if let Some(v) = special_case(&format!("{} {}", lower[i], lower[i + 1])) {
            valence = v;
        }
    }
    if i + 2 < lower.len() {
        if let Some(v) = special_case(&format!("{} {} {}", lower[i], lower[i + 1], lower[i + 2])) {
            valence = v;
        }
    }

    for n_gram in [&threetwoone, &threetwo, &twoone] {
        if let Some(b) = booster(n_gram) {
            valence += b;
        }
    }
    valence
}

fn least_check(valence: f64, lexicon: &Lexicon, lower: &[String], i: usize) -> f64 {
    if i > 1 && !lexicon.contains(&lower[i - 1]) && lower[i - 1] == "least" {
        if lower[i - 2] != "at" && lower[i - 2] != "very" {
            return valence * N_SCALAR;
        }
    } else if i > 0 && !lexicon.contains(&lower[i - 1]) && lower[i - 1] == "least" {
        return valence * N_SCALAR;
    }
    valence
}

/// Sentiment before a contrastive "but" is damped, after it amplified
fn but_check(lower: &[String], sentiments: &mut [f64]) {
    let Some(bi) = lower.iter().position(|w| w == "but") else {
        return;
    };
    for (si, sentiment) in sentiments.iter_mut().enumerate() {
        if si < bi {
            *sentiment *= 0.5;
        } else if si > bi {
            *sentiment *= 1.5;
        }
    }
}

fn punctuation_emphasis(text: &str) -> f64 {
    let ep_count = text.matches('!').count().min(4);
    let ep_amplifier = ep_count as f64 * 0.292;

    let qm_count = text.matches('?').count();
    let qm_amplifier = match qm_count {
        0 | 1 => 0.0,
        2 | 3 => qm_count as f64 * 0.18,
        _ => 0.96,
    };
    ep_amplifier + qm_amplifier
}

/// Map an unbounded valence sum into `[-1, 1]`
fn normalize(score: f64) -> f64 {
    let norm = score / (score * score + NORMALIZE_ALPHA).sqrt();
    norm.clamp(-1.0, 1.0)
}

fn sift_sentiment_scores(sentiments: &[f64]) -> (f64, f64, usize) {
    let mut pos_sum = 0.0;
    let mut neg_sum = 0.0;
    let mut neu_count = 0;
    for &s in sentiments {
        // +/-1 compensates for neutral words being counted as 1
        if s > 0.0 {
            pos_sum += s + 1.0;
        } else if s < 0.0 {
            neg_sum += s - 1.0;
        } else {
            neu_count += 1;
        }
    }
    (pos_sum, neg_sum, neu_count)
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn score_valence(sentiments: &[f64], text: &str) -> SentimentScores {
    if sentiments.is_empty() {
        return SentimentScores {
            compound: 0.0,
            positive: 0.0,
            neutral: 0.0,
            negative: 0.0,
        };
    }

    let punct_emph_amplifier = punctuation_emphasis(text);
    let mut sum_s: f64 = sentiments.iter().sum();
    if sum_s > 0.0 {
        sum_s += punct_emph_amplifier;
    } else if sum_s < 0.0 {
        sum_s -= punct_emph_amplifier;
    }
    let compound = normalize(sum_s);

    let (mut pos_sum, mut neg_sum, neu_count) = sift_sentiment_scores(sentiments);
    if pos_sum > neg_sum.abs() {
        pos_sum += punct_emph_amplifier;
    } else if pos_sum < neg_sum.abs() {
        neg_sum -= punct_emph_amplifier;
    }

    let total = pos_sum + neg_sum.abs() + neu_count as f64;
    SentimentScores {
        compound: round_to(compound, 4),
        positive: round_to((pos_sum / total).abs(), 3),
        neutral: round_to((neu_count as f64 / total).abs(), 3),
        negative: round_to((neg_sum / total).abs(), 3),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lexicon() -> Lexicon {
        Lexicon::parse("good\t1.9\ngreat\t3.1\nbad\t-2.5\nhorrible\t-2.5\nno\t-1.2\nlove\t3.2\n")
    }

    fn compound(text: &str) -> f64 {
        polarity_scores(&lexicon(), text).compound
    }

    #[test]
    fn test_single_word_valence() {
        let scores = polarity_scores(&lexicon(), "good");
        // 1.9 / sqrt(1.9^2 + 15)
        assert!((scores.compound - 0.4404).abs() < 1e-4);
        assert_eq!(scores.positive, 1.0);
        assert_eq!(scores.neutral, 0.0);
    }

    #[test]
    fn test_proportions_sum_to_one() {
        let scores = polarity_scores(&lexicon(), "The food was good but the service was bad.");
        let total = scores.positive + scores.neutral + scores.negative;
        assert!((total - 1.0).abs() < 0.01, "total was {}", total);
    }

    #[test]
    fn test_negation_flips_polarity() {
        assert!(compound("the movie was good") > 0.0);
        assert!(compound("the movie was not good") < 0.0);
        assert!(compound("the movie wasn't good") < 0.0);
    }

    #[test]
    fn test_boosters_and_dampeners() {
        let plain = compound("the movie was good");
        assert!(compound("the movie was very good") > plain);
        assert!(compound("the movie was slightly good") < plain);
        assert!(compound("the movie was kind of good") < plain);
    }

    #[test]
    fn test_caps_emphasis() {
        assert!(compound("the movie was GOOD") > compound("the movie was good"));
        // all caps text has no differential
        assert_eq!(compound("THE MOVIE WAS GOOD"), compound("the movie was good"));
    }

    #[test]
    fn test_punctuation_emphasis() {
        assert!(compound("the movie was good!!!") > compound("the movie was good"));
    }

    #[test]
    fn test_but_shifts_weight_to_second_clause() {
        assert!(compound("the plot was good but the acting was horrible") < 0.0);
        assert!(compound("the plot was horrible but the acting was great") > 0.0);
    }

    #[test]
    fn test_no_as_determiner() {
        // "no" before a sentiment word loses its own valence and negates the next one
        let scores = polarity_scores(&lexicon(), "there is no good option");
        assert!(scores.compound < 0.0);
    }

    #[test]
    fn test_least_negates() {
        assert!(compound("this is the least good idea") < 0.0);
        assert!(compound("it was at least good") > 0.0);
    }

    #[test]
    fn test_idiom_overrides_valence() {
        let lexicon = Lexicon::parse("death\t-2.9\nkiss\t1.8\n");
        let scores = polarity_scores(&lexicon, "it was the kiss of death");
        assert!(scores.compound < 0.0);
    }

    #[test]
    fn test_strip_punctuation() {
        assert_eq!(strip_punc_if_word("good!"), "good");
        assert_eq!(strip_punc_if_word(":)"), ":)");
        assert_eq!(strip_punc_if_word("it!"), "it!");
    }

    #[test]
    fn test_compound_bounds() {
        let text = "love ".repeat(200);
        let scores = polarity_scores(&lexicon(), &text);
        assert!(scores.compound <= 1.0 && scores.compound > 0.99);
    }

    #[test]
    fn test_empty_token_list_scores_zero() {
        let scores = polarity_scores(&lexicon(), "   ");
        assert_eq!(scores.compound, 0.0);
        assert_eq!(scores.neutral, 0.0);
    }
}
