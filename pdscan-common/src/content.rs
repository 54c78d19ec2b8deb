//! Static text shown on the page and printed in reports

use serde::Serialize;

/// Advice bullets printed under "Medical Advice" in every report
pub const MEDICAL_ADVICE: [&str; 5] = [
    "Consult your healthcare provider for personalized treatment.",
    "Engage in regular physical activity.",
    "Maintain a balanced diet rich in antioxidants.",
    "Stay socially active to support mental health.",
    "Consider joining support groups for shared experiences.",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Faq {
    pub question: &'static str,
    pub answer: &'static str,
}

const WHAT_IS: Faq = Faq {
    question: "What is Parkinson's disease?",
    answer: "Parkinson's disease is a progressive neurological disorder that affects movement.",
};
const SYMPTOMS: Faq = Faq {
    question: "What are the symptoms?",
    answer: "Common symptoms include tremors, stiffness, and difficulty with balance and coordination.",
};
const DIAGNOSIS: Faq = Faq {
    question: "How is it diagnosed?",
    answer: "Diagnosis is usually based on medical history and neurological examination.",
};
const TREATMENTS: Faq = Faq {
    question: "What treatments are available?",
    answer: "Treatments can include medications, physical therapy, and in some cases, surgery.",
};

/// Frequently asked questions, in page order
///
/// The first four entries appear twice on the published page and are kept
/// that way.
pub static FAQS: [Faq; 13] = [
    WHAT_IS,
    SYMPTOMS,
    DIAGNOSIS,
    TREATMENTS,
    WHAT_IS,
    SYMPTOMS,
    DIAGNOSIS,
    TREATMENTS,
    Faq {
        question: "What causes Parkinson's disease?",
        answer: "Parkinson's disease is believed to result from a combination of genetic and environmental factors. The exact cause is not fully understood, but it involves the degeneration of dopamine-producing neurons in the brain.",
    },
    Faq {
        question: "Is Parkinson's disease hereditary?",
        answer: "While most cases of Parkinson's disease are not directly inherited, genetic factors can increase the risk. Having a family member with the disease may slightly elevate your risk, but the majority of cases are sporadic.",
    },
    Faq {
        question: "Can Parkinson's disease be cured?",
        answer: "Currently, there is no cure for Parkinson's disease. However, various treatments and therapies can help manage symptoms and improve quality of life.",
    },
    Faq {
        question: "What lifestyle changes can help manage symptoms?",
        answer: "Regular exercise, a balanced diet, adequate sleep, and stress management techniques can significantly help in managing symptoms. Engaging in social activities and maintaining a strong support network are also beneficial.",
    },
    Faq {
        question: "Are there any clinical trials available for Parkinson's disease?",
        answer: "Yes, many clinical trials are ongoing to explore new treatments and therapies for Parkinson's disease. Patients interested in participating should consult with their healthcare provider for information on current trials and eligibility.",
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResourceLink {
    pub title: &'static str,
    pub url: &'static str,
}

pub const TELEMEDICINE_LINK: ResourceLink = ResourceLink {
    title: "Schedule a Telemedicine Appointment",
    url: "https://example.com/schedule",
};

pub static HELPFUL_RESOURCES: [ResourceLink; 2] = [
    ResourceLink {
        title: "Parkinson's Disease Foundation",
        url: "https://www.pdf.org",
    },
    ResourceLink {
        title: "National Parkinson's Foundation",
        url: "https://www.parkinson.org",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_faq_duplicates_preserved() {
        assert_eq!(FAQS[0], FAQS[4]);
        assert_eq!(FAQS[3], FAQS[7]);
        assert_ne!(FAQS[8], FAQS[0]);
    }

    #[test]
    fn test_resource_urls_are_https() {
        for link in HELPFUL_RESOURCES.iter().chain(std::iter::once(&TELEMEDICINE_LINK)) {
            assert!(link.url.starts_with("https://"), "{}", link.title);
        }
    }
}
