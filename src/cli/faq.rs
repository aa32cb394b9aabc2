use super::palette::Tone;

/// よくある質問（質問, 回答）
const FAQS: &[(&str, &str)] = &[
    (
        "What services does your Kline AI coding platform provide?",
        "Our platform offers AI-powered coding tools that assist developers in writing cleaner, more efficient code. We provide AI-driven code generation, real-time debugging, and intelligent code suggestions to enhance productivity.",
    ),
    (
        "How does the Kline AI code generator work?",
        "Our AI code generator uses advanced machine learning models to understand your project requirements and generate relevant code snippets based on your input. Simply describe your coding task, and our AI will suggest or generate code that you can integrate directly into your project.",
    ),
    (
        "When will Kline Coder Ai be released?",
        "Kline Coder Ai is currently in development and will be released to the public in the next few months. Stay tuned for updates and announcements on our website and social media channels.",
    ),
];

pub fn format_faq() -> String {
    let mut out = format!("{}\n\n", Tone::Title.paint("Frequently Asked Questions"));
    for (question, answer) in FAQS {
        out.push_str(&format!("{}\n", Tone::Body.paint(question)));
        out.push_str(&format!("  {}\n\n", Tone::Muted.paint(answer)));
    }
    out
}

pub fn print_faq() {
    print!("{}", format_faq());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn faq_lists_every_question() {
        let text = format_faq();
        for (question, _) in FAQS {
            assert!(text.contains(question));
        }
    }
}
