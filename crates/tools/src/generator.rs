//! Templated service-text generation
//!
//! Canonical templates for the six service types members sell, used by the
//! generator screen. The client briefing, when present, is appended as a
//! dedicated block so the member can adapt the template to the order.

use serde::{Deserialize, Serialize};

/// The fixed catalog of service types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceKind {
    InstagramBio,
    MarketplaceListing,
    ShortVideoScript,
    BrandNaming,
    Resume,
    InstagramPost,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 6] = [
        ServiceKind::InstagramBio,
        ServiceKind::MarketplaceListing,
        ServiceKind::ShortVideoScript,
        ServiceKind::BrandNaming,
        ServiceKind::Resume,
        ServiceKind::InstagramPost,
    ];

    /// Label shown in the service-type selector.
    pub fn label(&self) -> &'static str {
        match self {
            ServiceKind::InstagramBio => "Bio profissional para Instagram",
            ServiceKind::MarketplaceListing => "Descrição de produto Shopee/ML",
            ServiceKind::ShortVideoScript => "Roteiro para Reels/TikTok",
            ServiceKind::BrandNaming => "Nome de marca + slogan",
            ServiceKind::Resume => "Currículo profissional",
            ServiceKind::InstagramPost => "Post para Instagram",
        }
    }

    /// Resolve a selector label back to its kind.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.label() == label)
    }

    /// Filename for the downloaded result: whitespace becomes dashes, the
    /// label is lowercased otherwise unchanged.
    pub fn download_filename(&self) -> String {
        let slug: String = self
            .label()
            .to_lowercase()
            .chars()
            .map(|c| if c.is_whitespace() { '-' } else { c })
            .collect();
        format!("{}.txt", slug)
    }

    fn template(&self) -> &'static str {
        match self {
            ServiceKind::InstagramBio => {
                "🎯 Especialista em [sua área] | Transformando [problema] em [solução]\n\
                 📍 [Cidade]\n\
                 🚀 +500 clientes satisfeitos\n\
                 💼 Consultoria personalizada\n\
                 📩 DM para orçamento\n\
                 🔗 Link na bio 👇"
            }
            ServiceKind::MarketplaceListing => {
                "📦 [NOME DO PRODUTO] — Qualidade Premium\n\n\
                 ✅ Material de alta qualidade\n\
                 ✅ Envio rápido e seguro\n\
                 ✅ Garantia de satisfação\n\n\
                 📏 Especificações:\n\
                 • Tamanho: [X]\n\
                 • Material: [Y]\n\
                 • Cor: [Z]\n\n\
                 🔥 OFERTA POR TEMPO LIMITADO\n\
                 ⚡ Compre agora e receba em [prazo]!\n\n\
                 💬 Dúvidas? Chame no chat!"
            }
            ServiceKind::ShortVideoScript => {
                "🎬 ROTEIRO — [TEMA]\n\n\
                 [GANCHO - 0 a 3s]\n\
                 \"Você sabia que [dado impactante]?\"\n\n\
                 [DESENVOLVIMENTO - 3 a 12s]\n\
                 \"A maioria das pessoas faz [erro comum], mas o segredo é [dica].\"\n\n\
                 [CTA - 12 a 15s]\n\
                 \"Salva esse vídeo e manda pra alguém que precisa! Siga para mais dicas.\""
            }
            ServiceKind::BrandNaming => {
                "🏷️ Sugestões de Nome + Slogan:\n\n\
                 1. NovaPulse — \"Inovação que pulsa no seu negócio\"\n\
                 2. ClickBrand — \"Sua marca, um clique à frente\"\n\
                 3. VeloCity — \"Velocidade que gera resultados\"\n\
                 4. PrimeEdge — \"A vantagem que faz a diferença\"\n\
                 5. BrightPath — \"Iluminando o caminho do sucesso\""
            }
            ServiceKind::Resume => {
                "📄 CURRÍCULO PROFISSIONAL\n\n\
                 [NOME COMPLETO]\n\
                 [Cargo desejado]\n\n\
                 📧 email@exemplo.com | 📱 (XX) XXXXX-XXXX\n\
                 📍 [Cidade/Estado]\n\n\
                 --- RESUMO PROFISSIONAL ---\n\
                 Profissional com [X] anos de experiência em [área], especializado em \
                 [competência]. Reconhecido por [conquista].\n\n\
                 --- EXPERIÊNCIA ---\n\
                 [Empresa] — [Cargo] (20XX–Atual)\n\
                 • [Realização com métrica]\n\
                 • [Responsabilidade principal]\n\n\
                 --- FORMAÇÃO ---\n\
                 [Curso] — [Instituição] (20XX)"
            }
            ServiceKind::InstagramPost => {
                "📱 POST PARA INSTAGRAM\n\n\
                 [TÍTULO CHAMATIVO]\n\n\
                 Você sabia que [dado relevante]? 🤔\n\n\
                 A verdade é que [insight valioso].\n\n\
                 Aqui vão 3 dicas práticas:\n\n\
                 1️⃣ [Dica 1]\n\
                 2️⃣ [Dica 2]\n\
                 3️⃣ [Dica 3]\n\n\
                 💡 Salve este post para consultar depois!\n\n\
                 #[hashtag1] #[hashtag2] #[hashtag3]"
            }
        }
    }
}

impl std::fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Render the template for a service type, appending the client briefing
/// when one was provided.
pub fn generate(kind: ServiceKind, details: &str) -> String {
    let details = details.trim();
    if details.is_empty() {
        return kind.template().to_string();
    }
    format!("{}\n\n--- BRIEFING DO CLIENTE ---\n{}", kind.template(), details)
}
