use crate::{request::TakedownRequest, settings::Addressing};

/// Subject and plain-text body of one notice, ready to preview or send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailContent {
    pub subject: String,
    pub body: String,
}

/// Renders the notice for a validated request.
///
/// Deterministic and free of I/O, so the preview shown for confirmation is
/// exactly what goes out. Field values are appended verbatim in a single
/// pass; the output is never re-scanned, so brace or marker-like substrings
/// inside a field stay inert.
pub fn render(request: &TakedownRequest) -> EmailContent {
    let subject = format!("DMCA Takedown Notice from {}", request.from);

    let mut body = String::new();
    body.push_str("Dear GitHub Team,\n\n");
    body.push_str("I, ");
    body.push_str(&request.legal_name);
    body.push_str(
        ", am the copyright owner of content that is currently being infringed \
         on your website. Below is the DMCA takedown notice submission form.\n\n",
    );

    section(&mut body, "From", &request.from);
    section(
        &mut body,
        "Are you the copyright holder or authorized to act on the copyright owner's behalf?",
        &request.copyright_holder_or_authorized,
    );
    section(
        &mut body,
        "Are you submitting a revised DMCA notice after GitHub Trust & Safety requested \
         you make changes to your original notice?",
        &request.is_revised.to_string(),
    );
    section(
        &mut body,
        "Does your claim involve content on GitHub or npm.js?",
        &request.content_source.to_string(),
    );
    section(
        &mut body,
        "Please describe the nature of your copyright ownership or authorization to act \
         on the owner's behalf.",
        &request.ownership,
    );
    section(
        &mut body,
        "Please provide a detailed description of the original copyrighted work that has \
         allegedly been infringed. If possible, include a URL to where it is posted online.",
        &request.work_description,
    );
    section(
        &mut body,
        "What files should be taken down? Please provide URLs for each file, or if the \
         entire repository, the repository's URL.",
        &bullet_list(&request.infringing_urls),
    );
    section(
        &mut body,
        "Do you claim to have any technological measures in place to control access to \
         your copyrighted content? Please see our Complaints about Anti-Circumvention \
         Technology if you are unsure.",
        &request.access_control.to_string(),
    );
    section(
        &mut body,
        "Have you searched for any forks of the allegedly infringing files or \
         repositories? Each fork is a distinct repository and must be identified \
         separately if you believe it is infringing and wish to have it taken down.",
        &request.forks_information,
    );
    section(
        &mut body,
        "Is the work licensed under an open source license?",
        &request.open_source.to_string(),
    );
    section(
        &mut body,
        "What would be the best solution for the alleged infringement?",
        &request.solution,
    );
    section(
        &mut body,
        "Do you have the alleged infringer's contact information? If so, please provide it.",
        &request.contact,
    );

    // The affirmations the good_faith field stands for, fixed text per the form
    body.push_str(
        "* I have a good faith belief that use of the copyrighted materials described \
         above on the infringing web pages is not authorized by the copyright owner, or \
         its agent, or the law.\n\
         * I swear, under penalty of perjury, that the information in this notification \
         is accurate and that I am the copyright owner, or am authorized to act on behalf \
         of the owner, of an exclusive right that is allegedly infringed.\n\
         * I have taken fair use into consideration.\n\
         * I have read and understand GitHub's Guide to Submitting a DMCA Takedown \
         Notice.\n\n",
    );

    body.push_str(
        "* So that we can get back to you, please provide either your telephone number \
         or physical address.\n",
    );
    body.push_str(&request.phone);
    body.push('\n');
    body.push_str(&request.contact_email);
    body.push_str("\n\n");

    section(
        &mut body,
        "Please type your full legal name below to sign this request.",
        &request.legal_name,
    );

    body.push_str("Thank you for your attention to this matter.\n\nSincerely,\n");
    body.push_str(&request.legal_name);
    body.push('\n');

    EmailContent { subject, body }
}

fn section(body: &mut String, question: &str, answer: &str) {
    body.push_str("* ");
    body.push_str(question);
    body.push('\n');
    body.push_str(answer);
    body.push_str("\n\n");
}

fn bullet_list(urls: &[String]) -> String {
    urls.iter()
        .map(|url| format!("- {url}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Formats the block shown to the user before confirmation. Pure, like
/// `render`: the same content and addressing always produce the same text.
pub fn preview(content: &EmailContent, addressing: &Addressing) -> String {
    let rule = "=".repeat(70);
    let cc_line = match addressing.cc_email.as_ref() {
        Some(cc) => format!("CC: {cc}\n"),
        None => String::new(),
    };
    format!(
        "\n{rule}\n\
         FROM: {from_name} <{from_email}>\n\
         TO: {to_email}\n\
         {cc_line}\
         SUBJECT: {subject}\n\
         {rule}\n\n\
         {body}\n\
         {rule}",
        from_name = addressing.from_name,
        from_email = addressing.from_email,
        to_email = addressing.to_email,
        subject = content.subject,
        body = content.body,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{ContentSource, YesNo};

    fn sample_request() -> TakedownRequest {
        TakedownRequest {
            from: "Jane Doe".to_string(),
            copyright_holder_or_authorized: "I am the copyright holder".to_string(),
            is_revised: YesNo::No,
            content_source: ContentSource::GitHub,
            ownership: "Sole author of the work".to_string(),
            work_description: "A Rust crate at https://example.com/crate".to_string(),
            infringing_urls: vec![
                "https://github.com/someone/stolen-repo".to_string(),
                "https://github.com/someone/stolen-fork".to_string(),
            ],
            access_control: YesNo::No,
            forks_information: "No forks found".to_string(),
            open_source: YesNo::No,
            solution: "Remove the repository".to_string(),
            contact: "Unknown".to_string(),
            legal_name: "Jane Margaret Doe".to_string(),
            contact_email: "jane@example.com".to_string(),
            phone: "+1 555 0100".to_string(),
        }
    }

    fn sample_addressing(cc: Option<&str>) -> Addressing {
        Addressing {
            from_email: "admin@example.com".to_string(),
            from_name: "Mr. Admin".to_string(),
            to_email: "copyright@github.com".to_string(),
            reply_to: None,
            cc_email: cc.map(str::to_string),
        }
    }

    #[test]
    fn render_is_deterministic() {
        let request = sample_request();
        let first = render(&request);
        let second = render(&request);
        assert_eq!(first, second);
    }

    #[test]
    fn every_field_appears() {
        let request = sample_request();
        let content = render(&request);

        assert_eq!(content.subject, "DMCA Takedown Notice from Jane Doe");
        for expected in [
            "I am the copyright holder",
            "Sole author of the work",
            "A Rust crate at https://example.com/crate",
            "No forks found",
            "Remove the repository",
            "Unknown",
            "Jane Margaret Doe",
            "jane@example.com",
            "+1 555 0100",
        ] {
            assert!(content.body.contains(expected), "body missing {expected:?}");
        }
    }

    #[test]
    fn urls_render_one_per_line() {
        let content = render(&sample_request());
        assert!(content
            .body
            .contains("- https://github.com/someone/stolen-repo\n- https://github.com/someone/stolen-fork"));
    }

    #[test]
    fn brace_like_field_content_stays_literal() {
        // Arrange
        let mut request = sample_request();
        request.work_description = "code using {legal_name} and {from} markers".to_string();

        // Act
        let content = render(&request);

        // Assert
        assert!(content
            .body
            .contains("code using {legal_name} and {from} markers"));
    }

    #[test]
    fn preview_carries_addressing_headers() {
        let content = render(&sample_request());
        let text = preview(&content, &sample_addressing(None));
        assert!(text.contains("FROM: Mr. Admin <admin@example.com>"));
        assert!(text.contains("TO: copyright@github.com"));
        assert!(text.contains("SUBJECT: DMCA Takedown Notice from Jane Doe"));
        assert!(!text.contains("CC:"));
    }

    #[test]
    fn preview_shows_cc_when_configured() {
        let content = render(&sample_request());
        let text = preview(&content, &sample_addressing(Some("legal@example.com")));
        assert!(text.contains("CC: legal@example.com"));
    }
}
