//! Replies used when no relevant passage was found or the pipeline failed

use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Reply when answering failed after the gate
pub const APOLOGY: &str =
    "Desculpe, ocorreu um erro ao processar sua pergunta. Por favor, tente novamente.";

/// Replies when nothing relevant was retrieved
pub const NO_MATCH_RESPONSES: [&str; 10] = [
    "Poxa, revirei tudo por aqui e não encontrei nada que ajude. Mas posso falar sobre química ou o livro 'Nisto Cremos' se quiser. Tente ajustar sua pergunta! 😉",
    "Hmm, parece que fiquei sem respostas desta vez. Experimente reformular sua solicitação! Sabia que química envolve desde moléculas até reações incríveis? Posso ajudar nisso também! 😊",
    "Ops! Não encontrei nada relevante dessa vez. Que tal tentar de outra forma? Também sei bastante sobre o livro 'Nisto Cremos', caso queira explorar temas de fé e doutrina! 🙏",
    "Procurei em todos os cantos, mas nada se encaixou. Sabia que química estuda transformações da matéria? Ou, se preferir, posso explicar algum ponto do 'Nisto Cremos'. Ajuste sua pergunta e seguimos! 😊",
    "Parece que fiquei sem palavras... ou melhor, sem resultados! Posso ajudar com conceitos de química ou os 28 pontos de doutrina do 'Nisto Cremos'. Que tal reformular? 😅",
    "Ainda não encontrei nada relacionado. Mas ei, sabia que o 'Nisto Cremos' aborda temas profundos como a criação e a salvação? Ou que química é a base de muitas tecnologias? Reformule sua pergunta! 😉",
    "Caramba, essa foi difícil! Não achei nada por aqui. Talvez você queira saber algo sobre reações químicas ou os fundamentos do 'Nisto Cremos'? Ajuste sua solicitação! ✨",
    "Nada ainda! Mas sabia que o livro 'Nisto Cremos' é um guia espiritual sobre crenças adventistas? Ou que química une ciência e curiosidade? Me envie outra pergunta! 🚀",
    "Essa busca me deixou no vácuo. Que tal tentar de outro jeito? Eu posso explicar os pilares da química ou detalhar pontos do 'Nisto Cremos'. É só perguntar! 😅",
    "A busca deu zero resultados, mas calma! Posso ajudar com conceitos químicos ou temas do 'Nisto Cremos', como a Trindade ou a Criação. Reformule e seguimos! 🙌",
];

/// Picks an index in `0..len`
///
/// Any `Fn(usize) -> usize` closure is a chooser, which keeps tests
/// deterministic without a seeded RNG.
pub trait Chooser: Send + Sync {
    fn choose(&self, len: usize) -> usize;
}

impl<F> Chooser for F
where
    F: Fn(usize) -> usize + Send + Sync,
{
    fn choose(&self, len: usize) -> usize {
        self(len)
    }
}

/// Uniform chooser over a (optionally seeded) RNG
pub struct RandomChooser {
    rng: Mutex<StdRng>,
}

impl RandomChooser {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Reproducible sequence for a given seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomChooser {
    fn default() -> Self {
        Self::new()
    }
}

impl Chooser for RandomChooser {
    fn choose(&self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.rng.lock().gen_range(0..len)
    }
}

/// Serves fallback replies from a fixed pool
pub struct FallbackResponder {
    pool: Vec<String>,
    chooser: Arc<dyn Chooser>,
}

impl FallbackResponder {
    pub fn new(chooser: Arc<dyn Chooser>) -> Self {
        Self::with_pool(NO_MATCH_RESPONSES.iter().map(|s| s.to_string()).collect(), chooser)
    }

    /// Custom pool; an empty pool falls back to the apology
    pub fn with_pool(pool: Vec<String>, chooser: Arc<dyn Chooser>) -> Self {
        Self { pool, chooser }
    }

    /// One reply from the pool; out-of-range choices wrap around
    pub fn no_match(&self) -> &str {
        if self.pool.is_empty() {
            return APOLOGY;
        }
        let index = self.chooser.choose(self.pool.len()) % self.pool.len();
        &self.pool[index]
    }

    pub fn apology(&self) -> &'static str {
        APOLOGY
    }
}

impl Default for FallbackResponder {
    fn default() -> Self {
        Self::new(Arc::new(RandomChooser::new()))
    }
}
